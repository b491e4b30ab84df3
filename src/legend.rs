use crate::{
    color::{ColorMap, ColorScale, Rgb},
    config::Labels,
    range::{ClipPolicy, ValueRange},
    utils::{escape_html, group_thousands},
};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// How much the legend says beyond its swatches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Title and swatches only.
    Compact,
    /// Adds the display range and, when outliers are clipped, a note saying
    /// which share of the data shares the extreme colors.
    #[default]
    Detailed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
    pub label: String,
    pub t: f64,
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub title: String,
    pub swatches: Vec<Swatch>,
    pub range: ValueRange,
    pub policy: ClipPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Legend {
    /// Builds the legend from the same scale that colors the features, so a
    /// swatch and a fill at the same `t` can never disagree.
    pub fn new<C: ColorMap>(
        scale: &ColorScale<C>,
        policy: ClipPolicy,
        verbosity: Verbosity,
        labels: &Labels,
    ) -> Self {
        let swatches = [(&labels.low, 0.0), (&labels.mid, 0.5), (&labels.high, 1.0)]
            .into_iter()
            .map(|(label, t)| Swatch {
                label: label.clone(),
                t,
                color: scale.at(t),
            })
            .collect();

        let range = *scale.range();
        let (range_text, note) = match verbosity {
            Verbosity::Compact => (None, None),
            Verbosity::Detailed => {
                let caption = match policy.clips() {
                    true => &labels.clipped_range,
                    false => &labels.full_range,
                };
                let range_text = format!(
                    "{caption}：{} 〜 {}",
                    group_thousands(range.min()),
                    group_thousands(range.max())
                );
                (Some(range_text), clip_note(&policy, labels))
            }
        };

        Self {
            title: labels.metric.clone(),
            swatches,
            range,
            policy,
            range_text,
            note,
        }
    }

    /// Renders the legend panel body as HTML.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let _ = writeln!(
            html,
            r#"<div style="font-weight:600; margin-bottom:6px;">{}</div>"#,
            escape_html(&self.title)
        );
        for swatch in &self.swatches {
            let _ = writeln!(
                html,
                r#"<div class="legend-row"><span class="swatch" style="background:{}"></span>{}</div>"#,
                swatch.color,
                escape_html(&swatch.label)
            );
        }
        if let Some(range_text) = &self.range_text {
            let _ = writeln!(
                html,
                r#"<div style="margin-top:6px; color:#444;">{}</div>"#,
                escape_html(range_text)
            );
        }
        if let Some(note) = &self.note {
            let _ = writeln!(
                html,
                r#"<div style="margin-top:4px; color:#666; font-size:12px;">{}</div>"#,
                escape_html(note)
            );
        }
        html
    }
}

fn clip_note(policy: &ClipPolicy, labels: &Labels) -> Option<String> {
    match policy {
        ClipPolicy::Quantile { low, high } => Some(
            labels
                .clip_note
                .replace("{low}", &percent(*low).to_string())
                .replace("{high}", &percent(1. - high).to_string()),
        ),
        ClipPolicy::MinMax => None,
    }
}

fn percent(share: f64) -> f64 {
    (share * 1000.).round() / 10.
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> ColorScale {
        ColorScale::new(ValueRange::new(1234.4, 987654.5).unwrap())
    }

    #[test]
    fn detailed_legend() {
        let legend = Legend::new(
            &scale(),
            ClipPolicy::default(),
            Verbosity::Detailed,
            &Labels::default(),
        );

        let colors: Vec<String> = legend.swatches.iter().map(|s| s.color.to_string()).collect();
        assert_eq!(colors, vec!["rgb(0,80,255)", "rgb(128,40,128)", "rgb(255,0,0)"]);
        insta::assert_snapshot!(
            legend.range_text.as_deref().unwrap(),
            @"表示範囲（外れ値カット）：1,234 〜 987,655"
        );
        insta::assert_snapshot!(
            legend.note.as_deref().unwrap(),
            @"※ 下位5%・上位5%は同じ色に丸めています"
        );
    }

    #[test]
    fn min_max_has_no_note() {
        let legend = Legend::new(
            &scale(),
            ClipPolicy::MinMax,
            Verbosity::Detailed,
            &Labels::default(),
        );
        assert_eq!(legend.note, None);
        assert!(legend.range_text.unwrap().starts_with("表示範囲："));
    }

    #[test]
    fn compact_legend_html() {
        let legend = Legend::new(
            &scale(),
            ClipPolicy::default(),
            Verbosity::Compact,
            &Labels::default(),
        );
        let html = legend.to_html();
        assert_eq!(html.lines().count(), 4);
        assert!(html.contains(r#"style="background:rgb(255,0,0)"></span>高</div>"#));
        assert!(!html.contains("表示範囲"));
    }

    #[test]
    fn html_escapes_labels() {
        let labels = Labels {
            metric: "<price>".into(),
            ..Default::default()
        };
        let legend = Legend::new(&scale(), ClipPolicy::MinMax, Verbosity::Compact, &labels);
        assert!(legend.to_html().contains("&lt;price&gt;"));
    }

    #[test]
    fn inverted_range_is_rejected_on_load() {
        let legend = Legend::new(
            &scale(),
            ClipPolicy::MinMax,
            Verbosity::Compact,
            &Labels::default(),
        );
        let mut json = serde_json::to_value(&legend).unwrap();
        json["range"] = serde_json::json!({ "min": 5.0, "max": 1.0 });

        assert!(serde_json::from_value::<Legend>(json).is_err());
    }
}
