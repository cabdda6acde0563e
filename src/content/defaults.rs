//! Built-in content, served when no backend has a document.

use super::ContentDocument;
use serde_json::{json, Value};

fn slides() -> Value {
    json!({
        "finance": ["/slides/Slide12.jpg", "/slides/Slide13.jpg"],
        "legacy": ["/slides/Slide18.jpg", "/slides/Slide19.jpg", "/slides/Slide20.jpg"],
        "public": ["/slides/Slide15.jpg", "/slides/Slide16.jpg"],
        "salesforce": [
            "/slides/Slide22.jpg", "/slides/Slide23.jpg", "/slides/Slide24.jpg",
            "/slides/Slide25.jpg", "/slides/Slide26.jpg", "/slides/Slide27.jpg"
        ],
        "fpt": [
            "/slides/Slide4.jpg", "/slides/Slide5.jpg", "/slides/Slide6.jpg",
            "/slides/Slide7.jpg", "/slides/Slide8.jpg", "/slides/Slide9.jpg"
        ]
    })
}

fn partner_logos() -> Value {
    json!([
        { "logo": "/partners/ntt-data--600.png", "width": 120, "height": 60 },
        { "logo": "/partners/596797.png", "width": 120, "height": 60 },
        { "logo": "/partners/fujitsu.webp", "width": 120, "height": 60 },
        { "logo": "/partners/deutsche-bank.webp", "width": 120, "height": 60 },
        { "logo": "/partners/docmagic.webp", "width": 120, "height": 60 },
        { "logo": "/partners/symphony.webp", "width": 120, "height": 60 }
    ])
}

fn japanese() -> Value {
    json!({
        "hero": {
            "title": "FSG事業部 デジタル変革のパートナー",
            "subtitle": "FPTソフトウェアジャパンの金融・公共・レガシー・Salesforce専門部門として、19年以上の実績で日本企業のDXを支援します。",
            "explore": "詳細を見る",
            "demo": "サービス紹介"
        },
        "about": {
            "title": "FSG事業部について",
            "subtitle": "金融・公共・レガシー・Salesforceの4つの専門分野で日本のデジタル変革をリードしています。",
            "mission": { "title": "ミッション", "desc": "金融業界のデジタル変革を支援します。" },
            "vision": { "title": "ビジョン", "desc": "公共機関・教育機関のスマートシティ化を推進します。" },
            "values": { "title": "バリュー", "desc": "レガシーシステムの移行とCRM統合で競争力向上に貢献します。" }
        },
        "services": {
            "title": "私たちのサービス",
            "subtitle": "金融、パブリック、レガシーモダナイゼーション、Salesforceの4つの主要領域",
            "finance": { "title": "金融サービス", "desc": "銀行・保険・証券業界向けの包括的なソリューション。", "stats": "500名+エンジニア" },
            "legacy": { "title": "レガシーモダナイゼーション", "desc": "COBOLから最新技術までのマイグレーション。", "stats": "19年+経験" },
            "public": { "title": "パブリックサービス", "desc": "官公庁・自治体・教育機関向けソリューション。", "stats": "15拠点全国展開" },
            "salesforce": { "title": "Salesforceソリューション", "desc": "Sales Cloud、Service Cloud等の包括的なソリューション。", "stats": "200名+専門家" }
        },
        "products": {
            "title": "主要実績",
            "subtitle": "4つの専門分野における代表的なプロジェクト実績",
            "custom": { "title": "カスタマイズソリューションをお探しですか？", "desc": "無料相談をご利用ください。" }
        },
        "partners": {
            "title": "パートナー",
            "subtitle": "信頼できるパートナー企業",
            "additional": "その他多数の企業様とも協業しています",
            "logos": partner_logos()
        },
        "contact": {
            "title": "お問い合わせ",
            "subtitle": "無料相談とお客様に最適なソリューションを見つけるサポートをご提供します",
            "hours_weekday": "月-金: 8:00 - 18:00",
            "hours_saturday": "土: 8:00 - 12:00",
            "info": { "title": "連絡先情報" },
            "form": {
                "name": "氏名 *",
                "email": "メール *",
                "phone": "電話番号",
                "company": "会社名",
                "message": "メッセージ内容 *",
                "submit": "相談依頼を送信",
                "select_service": "サービスを選択",
                "service_other": "その他"
            }
        },
        "footer": {
            "description": "金融・公共・レガシー・Salesforceの専門部門",
            "company": "FPTソフトウェアジャパン",
            "copyright": "© FPT Software Japan. All rights reserved."
        },
        "slides": slides(),
        "global_network": {
            "title": "グローバルネットワーク",
            "subtitle": "世界各地の拠点から日本のお客様を支援します"
        }
    })
}

fn vietnamese() -> Value {
    json!({
        "hero": {
            "title": "FSG事業部 - Đối Tác Chuyển Đổi Số",
            "subtitle": "Phòng ban chuyên về Tài chính, Dịch vụ công, Legacy và Salesforce thuộc FPT Software Japan, hỗ trợ DX với 19+ năm kinh nghiệm.",
            "explore": "Tìm Hiểu Thêm",
            "demo": "Giới Thiệu Dịch Vụ"
        },
        "about": {
            "title": "Về Phòng Ban FSG",
            "subtitle": "Chuyên về 4 lĩnh vực: Tài chính, Dịch vụ công, Hiện đại hóa hệ thống cũ và Salesforce.",
            "mission": { "title": "Sứ Mệnh", "desc": "Hỗ trợ chuyển đổi số cho ngành tài chính." },
            "vision": { "title": "Tầm Nhìn", "desc": "Thúc đẩy xây dựng thành phố thông minh." },
            "values": { "title": "Giá Trị", "desc": "Chuyển đổi hệ thống cũ và tích hợp CRM Salesforce." }
        },
        "services": {
            "title": "Dịch Vụ Của Chúng Tôi",
            "subtitle": "Giải pháp chuyên môn trong 4 lĩnh vực chính",
            "finance": { "title": "Dịch Vụ Tài Chính", "desc": "Giải pháp toàn diện cho ngân hàng, bảo hiểm, chứng khoán.", "stats": "500+ kỹ sư" },
            "legacy": { "title": "Hiện Đại Hóa Hệ Thống", "desc": "Chuyển đổi từ COBOL sang công nghệ mới.", "stats": "19+ năm" },
            "public": { "title": "Dịch Vụ Công", "desc": "Giải pháp cho cơ quan nhà nước và giáo dục.", "stats": "15 chi nhánh" },
            "salesforce": { "title": "Giải Pháp Salesforce", "desc": "Sales Cloud, Service Cloud và hơn nữa.", "stats": "200+ chuyên gia" }
        },
        "products": {
            "title": "Thành Tựu Chính",
            "subtitle": "Các dự án tiêu biểu trong 4 lĩnh vực chuyên môn",
            "custom": { "title": "Bạn cần giải pháp tùy chỉnh?", "desc": "Hãy sử dụng dịch vụ tư vấn miễn phí." }
        },
        "partners": {
            "title": "Đối Tác",
            "subtitle": "Các đối tác đáng tin cậy",
            "additional": "Và nhiều doanh nghiệp khác",
            "logos": partner_logos()
        },
        "contact": {
            "title": "Liên Hệ",
            "subtitle": "Tư vấn miễn phí và hỗ trợ tìm giải pháp phù hợp nhất",
            "hours_weekday": "T2-T6: 8:00 - 18:00",
            "hours_saturday": "T7: 8:00 - 12:00",
            "info": { "title": "Thông Tin Liên Hệ" },
            "form": {
                "name": "Họ tên *",
                "email": "Email *",
                "phone": "Số điện thoại",
                "company": "Tên công ty",
                "message": "Nội dung *",
                "submit": "Gửi yêu cầu tư vấn",
                "select_service": "Chọn dịch vụ",
                "service_other": "Khác"
            }
        },
        "footer": {
            "description": "Phòng ban chuyên về Tài chính, Dịch vụ công, Legacy và Salesforce",
            "company": "FPT Software Japan",
            "copyright": "© FPT Software Japan. All rights reserved."
        },
        "slides": slides(),
        "global_network": {
            "title": "Mạng Lưới Toàn Cầu",
            "subtitle": "Hỗ trợ khách hàng Nhật Bản từ các chi nhánh trên toàn thế giới"
        }
    })
}

/// The document served when every backend comes up empty.
pub fn default_document() -> ContentDocument {
    let into_map = |value: Value| match value {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    ContentDocument::new(into_map(japanese()), into_map(vietnamese()))
}
