use crate::{
    config::Labels,
    utils::{escape_html, group_thousands},
};

/// Builds the popup body shown when a feature is clicked.
pub fn popup_html(value: Option<f64>, count: u64, labels: &Labels) -> String {
    let value = match value {
        Some(v) => group_thousands(v),
        None => escape_html(&labels.no_data),
    };

    format!(
        concat!(
            r#"<div style="font-family:system-ui,-apple-system,Segoe UI,sans-serif;">"#,
            r#"<div style="font-weight:600;">{title}</div>"#,
            r#"<div>{value}</div>"#,
            r#"<div style="margin-top:6px;color:#444;">{count_label}: {count}</div>"#,
            r#"</div>"#
        ),
        title = escape_html(&labels.metric),
        value = value,
        count_label = escape_html(&labels.count),
        count = count,
    )
}
