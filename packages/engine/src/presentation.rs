//! Popup text shown for each matching parcel.

use parcel_map_parcel_models::Parcel;

/// Shown in place of a tax site link when a parcel has no URL.
pub const NO_URL_MARKER: &str = "No URL available";

/// Shown for a missing owner name or market value.
const UNKNOWN: &str = "Unknown";

/// Builds the popup HTML for `parcel`: owner, acreage, market value, and
/// either a tax site link or [`NO_URL_MARKER`].
///
/// Numbers always keep a fractional part (`2.0`, `250000.0`).
#[must_use]
pub fn popup_content(parcel: &Parcel) -> String {
    let owner = parcel
        .owner_name
        .as_deref()
        .map_or_else(|| UNKNOWN.to_string(), escape_html);
    let value = parcel
        .estimated_value
        .map_or_else(|| UNKNOWN.to_string(), |v| format!("{v:?}"));
    let tax_site = parcel.url.as_deref().map_or_else(
        || NO_URL_MARKER.to_string(),
        |url| {
            format!(
                "<a href='{}' target='_blank'>Link to Tax Site</a>",
                escape_html(url)
            )
        },
    );

    format!(
        "Owner: {owner}<br>Acres: {acres:?}<br>Market Value: {value}<br>Tax Site: {tax_site}",
        acres = parcel.acres,
    )
}

/// Escapes text for use in HTML content and single- or double-quoted
/// attributes.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
