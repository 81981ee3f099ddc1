//! Rendering: turning diffs and the current product list into the
//! notification body, in both HTML and plain-text flavors.

use crate::strings::thousands;

use super::model::{DiffKind, Product, ProductDiff};
use super::settings::CommandSettings;

const NEW_MARK: &str = "🆕";
const PRICE_CHANGED_MARK: &str = "🔄";

/// One product line, HTML or plain text per `supports_html`.
fn render_product_line(product: &Product, prev_price: Option<i64>, mark: &str, supports_html: bool) -> String {
    let price = thousands(product.low_price);
    let mut line = if supports_html {
        format!(
            "☞ <a href=\"{}\"><b>{}</b></a> ({}) {}원",
            product.link, product.title, product.mall_name, price
        )
    } else {
        format!(
            "☞ {} ({}) {}원\n{}",
            product.title, product.mall_name, price, product.link
        )
    };

    if let Some(prev_price) = prev_price {
        line.push_str(&format!(" (이전: {}원)", thousands(prev_price)));
    }

    line.push(' ');
    line.push_str(mark);
    line
}

fn render_diff_line(diff: &ProductDiff, supports_html: bool) -> String {
    match diff.kind {
        DiffKind::New => render_product_line(&diff.product, None, NEW_MARK, supports_html),
        DiffKind::PriceChanged => render_product_line(
            &diff.product,
            diff.prev.as_ref().map(|p| p.low_price),
            PRICE_CHANGED_MARK,
            supports_html,
        ),
    }
}

/// Render the diff list, one blank line between entries.
pub fn render_diffs(diffs: &[ProductDiff], supports_html: bool) -> String {
    diffs
        .iter()
        .map(|d| render_diff_line(d, supports_html))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the current product list (used for the "no changes, here's what's
/// still being watched" user-requested report).
pub fn render_current_list(products: &[Product], supports_html: bool) -> String {
    products
        .iter()
        .map(|p| render_product_line(p, None, "", supports_html).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Bullet the active search conditions: query, include/exclude keywords
/// (printed verbatim, blank if absent), and the price threshold.
pub fn render_conditions(settings: &CommandSettings) -> String {
    format!(
        "검색어: {}\n포함 키워드: {}\n제외 키워드: {}\n가격 조건: {}원 미만",
        settings.query,
        settings.filters.included_keywords.join(", "),
        settings.filters.excluded_keywords.join(", "),
        thousands(settings.filters.price_less_than),
    )
}
