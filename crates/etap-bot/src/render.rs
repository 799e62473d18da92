use etap_engine::flow::{Message, ResultSummary};
use std::fmt::Write;

/// Renders an engine message into transport text. Prompt options are shown
/// inline; a real messenger transport would turn them into buttons.
#[must_use]
pub fn render(message: &Message) -> String {
    match message {
        Message::Info(text) => text.clone(),
        Message::Prompt(prompt) => {
            if prompt.options.is_empty() {
                prompt.text.clone()
            } else {
                format!("{}\n[{}]", prompt.text, prompt.options.join(" | "))
            }
        }
        Message::Summary(summary) => render_summary(summary),
    }
}

fn render_summary(summary: &ResultSummary) -> String {
    let mut text = String::from("📊 Результаты диагностики\n");
    if summary.stage == 0 {
        text.push_str("Этап: 0 (порог первого этапа не пройден)\n");
    } else {
        let _ = writeln!(text, "Этап: {}", summary.stage);
    }
    let sums = summary
        .sums
        .iter()
        .map(|(block, sum)| format!("{block}: {sum}"))
        .collect::<Vec<_>>()
        .join(" | ");
    text.push_str(&sums);
    if summary.distorted {
        let _ = write!(
            text,
            "\n⚠️ Заметна идеализация ответов ({}): результат может быть завышен.",
            summary.distortion
        );
    }
    if let Some(interpretation) = &summary.interpretation {
        let _ = write!(
            text,
            "\n\n{} · {}\n{}",
            interpretation.stage_title, interpretation.level_title, interpretation.description
        );
        if !interpretation.recommendations.is_empty() {
            text.push_str("\nРекомендации:");
            for recommendation in &interpretation.recommendations {
                let _ = write!(text, "\n• {recommendation}");
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use etap_engine::flow::{Prompt, ResolvedInterpretation};

    #[test]
    fn prompt_options_render_inline() {
        let message = Message::Prompt(Prompt {
            text: "A1/8\nstatement".to_owned(),
            options: vec!["0".to_owned(), "1".to_owned()],
        });
        assert_eq!(render(&message), "A1/8\nstatement\n[0 | 1]");
    }

    #[test]
    fn open_prompt_renders_without_option_row() {
        let message = Message::Prompt(Prompt {
            text: "D1/10\nprompt".to_owned(),
            options: vec![],
        });
        assert_eq!(render(&message), "D1/10\nprompt");
    }

    #[test]
    fn summary_includes_warning_and_interpretation() {
        let summary = ResultSummary {
            stage: 2,
            sums: vec![("B1".to_owned(), 30), ("B2".to_owned(), 28)],
            distortion: 5,
            distorted: true,
            interpretation: Some(ResolvedInterpretation {
                stage_title: "Второй этап".to_owned(),
                level_title: "Уверенно".to_owned(),
                description: "описание".to_owned(),
                recommendations: vec!["продолжайте".to_owned()],
            }),
        };
        let text = render(&Message::Summary(summary));
        assert!(text.contains("Этап: 2"));
        assert!(text.contains("B1: 30 | B2: 28"));
        assert!(text.contains("⚠️"));
        assert!(text.contains("Второй этап · Уверенно"));
        assert!(text.contains("• продолжайте"));
    }

    #[test]
    fn stage_zero_summary_explains_the_threshold() {
        let summary = ResultSummary {
            stage: 0,
            sums: vec![("B1".to_owned(), 20)],
            distortion: 0,
            distorted: false,
            interpretation: None,
        };
        let text = render(&Message::Summary(summary));
        assert!(text.contains("порог первого этапа не пройден"));
        assert!(!text.contains('⚠'));
    }
}
