//! HTML 断片 - 商品カードと一覧

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::domain::{ProductImage, ProductRecord};

pub const EMPTY_CATALOG_MESSAGE: &str = "No products yet. Click + Add Product to create one.";

const PLACEHOLDER_SVG: &str = concat!(
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="140">"##,
    r##"<rect fill="#eef6fb" width="100%" height="100%"/>"##,
    r##"<text x="50%" y="50%" dominant-baseline="middle" text-anchor="middle" "##,
    r##"fill="#9ecfe9" font-family="Inter, Arial" font-size="14">No Image</text></svg>"##,
);

/// 要素の中身・属性値として安全な形にエスケープ
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

/// "No Image" プレースホルダーの data URI
///
/// 外部アセットに依存せず、常に同じ文字列を返す。
pub fn placeholder_image() -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(PLACEHOLDER_SVG))
}

/// 商品画像の描画に使う src 文字列
pub fn image_src(image: &ProductImage) -> String {
    match image {
        ProductImage::None => placeholder_image(),
        ProductImage::Static(path) => path.clone(),
        ProductImage::Blob(handle) => handle.to_string(),
    }
}

/// 3 桁区切り、小数は最大 2 桁（"1,234.5"）
///
/// 整数部は f64 をそのまま文字列化するので、巨大な値でも桁が崩れない。
pub fn format_price(price: f64) -> String {
    let fixed = format!("{:.2}", price.max(0.0));
    let (digits, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac.trim_end_matches('0') {
        "" => grouped,
        frac => format!("{grouped}.{frac}"),
    }
}

pub fn render_card(record: &ProductRecord, index: usize) -> String {
    format!(
        r#"<div class="card">
  <div class="card-head">
    <img src="{src}" class="product-icon" alt="Image Product">
    <h3>{name}</h3>
  </div>
  <div class="card-body">
    <p><strong>Category:</strong> {category}</p>
    <p><strong>Price:</strong> ${price}</p>
    <p class="desc-line"><span class="label">Desc:</span><span class="value">{desc}</span></p>
    <hr class="sep">
    <div class="actions">
      <button class="icon-btn" data-action="edit" data-idx="{index}"><i class="ri-pencil-fill"></i></button>
      <button class="icon-btn" data-action="delete" data-idx="{index}"><i class="ri-delete-bin-fill"></i></button>
    </div>
  </div>
</div>
"#,
        src = escape_html(&image_src(&record.image)),
        name = escape_html(&record.name),
        category = escape_html(&record.category),
        price = format_price(record.price),
        desc = escape_html(&record.description),
    )
}

/// 全カードを順番に、空なら案内メッセージを返す
pub fn render_products(records: &[ProductRecord]) -> String {
    if records.is_empty() {
        return format!(r#"<p class="empty">{EMPTY_CATALOG_MESSAGE}</p>"#);
    }
    records
        .iter()
        .enumerate()
        .map(|(index, record)| render_card(record, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::BlobHandleRegistry;
    use rstest::rstest;

    fn record(name: &str, image: ProductImage) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            category: "Tools".to_string(),
            price: 1500.0,
            description: "sharp".to_string(),
            image,
        }
    }

    #[test]
    fn escape_html_covers_all_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;&#x2F;a&gt;"
        );
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn placeholder_is_deterministic_svg_data_uri() {
        let a = placeholder_image();
        assert_eq!(a, placeholder_image());
        assert!(a.starts_with("data:image/svg+xml;base64,"));

        let encoded = a.trim_start_matches("data:image/svg+xml;base64,");
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.contains("No Image"));
    }

    #[rstest]
    #[case(0.0, "0")]
    #[case(108.0, "108")]
    #[case(1234.5, "1,234.5")]
    #[case(1234567.891, "1,234,567.89")]
    #[case(999.999, "1,000")]
    #[case(0.05, "0.05")]
    #[case(1e20, "100,000,000,000,000,000,000")]
    #[case(184467440737095516.0, "184,467,440,737,095,520")]
    fn price_formatting(#[case] price: f64, #[case] expected: &str) {
        assert_eq!(format_price(price), expected);
    }

    #[test]
    fn image_src_resolves_each_variant() {
        let handle = BlobHandleRegistry::new().register(vec![1, 2, 3]);
        assert_eq!(image_src(&ProductImage::Blob(handle.clone())), handle.to_string());
        assert_eq!(image_src(&ProductImage::Static("./a.svg".into())), "./a.svg");
        assert_eq!(image_src(&ProductImage::None), placeholder_image());
    }

    #[test]
    fn card_escapes_user_text() {
        let html = render_card(&record("<b>Saw</b>", ProductImage::None), 3);
        assert!(html.contains("&lt;b&gt;Saw&lt;&#x2F;b&gt;"));
        assert!(html.contains(r#"data-idx="3""#));
        assert!(html.contains("$1,500"));
    }

    #[test]
    fn empty_list_renders_message() {
        assert!(render_products(&[]).contains(EMPTY_CATALOG_MESSAGE));
    }

    #[test]
    fn list_renders_one_card_per_record() {
        let records = vec![
            record("Saw", ProductImage::None),
            record("Drill", ProductImage::Static("./d.svg".into())),
        ];
        let html = render_products(&records);
        assert_eq!(html.matches(r#"<div class="card">"#).count(), 2);
        assert!(html.contains(r#"data-idx="1""#));
    }
}
