//! View - 商品一覧の HTML レンダリング
//!
//! レイアウトやスタイルは扱わず、エスケープ済みの断片だけを返します。

pub mod html;

pub use self::html::{
    EMPTY_CATALOG_MESSAGE, escape_html, format_price, image_src, placeholder_image, render_card,
    render_products,
};
