//! Parent-facing HTML report
//!
//! Only parent advice is rendered here. Teacher notes stay inside the API.

use super::types::FeedbackResult;

pub struct ParentReport<'a> {
    pub student_name: &'a str,
    pub score: f64,
    pub feedback: &'a FeedbackResult,
}

impl ParentReport<'_> {
    pub fn file_name(&self) -> String {
        let slug: String = self
            .student_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        format!("Report_{slug}.html")
    }

    pub fn render(&self) -> String {
        let advice_items: String = self
            .feedback
            .parent_advice
            .iter()
            .map(|item| format!("<li style=\"margin-bottom:10px;\">{}</li>", escape_html(item)))
            .collect();

        format!(
            r#"<html>
<head>
<meta charset="utf-8">
<style>
body {{ font-family: 'Segoe UI', Tahoma, sans-serif; color: #333; padding: 20px; background-color: #f4f4f4; }}
.container {{ max-width: 800px; margin: 0 auto; background-color: #fff; padding: 40px; border-radius: 15px; }}
.header {{ text-align: center; border-bottom: 2px solid #4CAF50; padding-bottom: 20px; margin-bottom: 30px; }}
.score-box {{ background-color: #f9f9f9; padding: 20px; border-radius: 10px; text-align: center; margin-bottom: 30px; }}
.score {{ font-size: 48px; font-weight: bold; color: #4CAF50; margin: 10px 0; }}
.risk {{ font-size: 22px; font-weight: bold; color: #555; }}
.advice-section {{ background-color: #e8f5e9; padding: 25px; border-radius: 10px; border-left: 5px solid #4CAF50; }}
.footer {{ margin-top: 40px; text-align: center; font-size: 12px; color: #888; }}
</style>
</head>
<body>
<div class="container">
<div class="header">
<h1>🎓 EduAnalytix Progress Report</h1>
<p>Dear Parent,</p>
</div>
<p>Below are the results of the AI-assisted academic performance analysis for <strong>{name}</strong>.</p>
<div class="score-box">
<div>Predicted End-of-Term Score</div>
<div class="score">{score:.1} / 100</div>
<div class="risk">Overall Status: {icon} {risk}</div>
</div>
<div class="advice-section">
<h2>💡 Development and Support Suggestions</h2>
<ul>
{advice_items}
</ul>
</div>
<div class="footer">
Generated by the EduAnalytix decision support system.<br>
School Guidance Service
</div>
</div>
</body>
</html>
"#,
            name = escape_html(self.student_name),
            score = self.score,
            icon = self.feedback.icon,
            risk = self.feedback.risk_label,
        )
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
