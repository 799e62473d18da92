use crate::interpret;
use crate::score;
use crate::session::{AnswerKey, SessionState};
use etap_config::QuestionBank;
use strum::EnumDiscriminants;

const GREETING: &str = "Привет! Это диагностика «Этап-Тест 7D». Отвечайте честно, время ≈30 мин.";
const INTERVIEW_INTRO: &str = "Блок D: отвечайте текстом. В любое время можно отправить /stop.";
const INTERVIEW_DONE: &str = "Спасибо! Вы завершили интервью.";
const FAREWELL: &str = "Опрос завершён. Благодарю за искренность.";
const CANCELLED: &str = "Диагностика прервана.";
const RESULT_UNAVAILABLE: &str = "Результат недоступен. Пожалуйста, свяжитесь с оператором.";
const RESULT_CHOICE: &str = "Выберите действие.";

const SCALE_OPTIONS: [&str; 5] = ["0", "1", "2", "3", "4"];
const BOOL_OPTIONS: [&str; 2] = ["True", "False"];
const RESULT_OPTIONS: [&str; 2] = ["➕ Блок D (интервью)", "Готово"];

/// The explicit conversation state. Transitions are dispatched on the
/// (state, action kind) pair; everything else is rejected defensively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum State {
    Screening,
    Stages,
    Idealization,
    Result,
    Interview,
    Done,
    Cancelled,
}

/// A typed inbound action, validated once at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(ActionKind), derive(strum::Display))]
pub enum Action {
    /// Explicit conversation (re)start.
    Begin,
    /// A scaled selection, 0..=4.
    Scale(u8),
    /// A boolean selection.
    Choice(bool),
    /// Free-form text.
    Text(String),
    /// "begin interview" selection on the result screen.
    StartInterview,
    /// "finish" selection on the result screen.
    Finish,
    /// Stop inside the interview block.
    Stop,
    /// Cancel from anywhere.
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInterpretation {
    pub stage_title: String,
    pub level_title: String,
    pub description: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub stage: u8,
    /// Per-stage sums in display order ("B1".."B7").
    pub sums: Vec<(String, u32)>,
    pub distortion: u8,
    pub distorted: bool,
    pub interpretation: Option<ResolvedInterpretation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Prompt(Prompt),
    Info(String),
    Summary(ResultSummary),
}

/// Outcome of one transition: the outbound messages, and on interview
/// completion the transcript to forward to the operator.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Turn {
    pub messages: Vec<Message>,
    pub transcript: Option<Vec<String>>,
}

impl Turn {
    fn messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            transcript: None,
        }
    }
}

/// One respondent's conversation: the state machine plus the session
/// record it mutates. Owned exclusively by the session store entry.
#[derive(Debug)]
pub struct Conversation {
    state: State,
    session: SessionState,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Screening,
            session: SessionState::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, State::Done | State::Cancelled)
    }

    /// Applies one inbound action. Malformed or out-of-sequence actions
    /// never mutate the session; the current prompt is re-emitted instead.
    pub fn handle(&mut self, bank: &QuestionBank, action: Action) -> Turn {
        match (self.state, action) {
            // an explicit (re)start overwrites any prior progress
            (_, Action::Begin) => {
                *self = Self::new();
                Turn::messages(vec![Message::Info(GREETING.to_owned()), self.current_prompt(bank)])
            }
            (State::Screening, Action::Scale(value)) => self.on_screening_answer(bank, value),
            (State::Stages, Action::Scale(value)) => self.on_stage_answer(bank, value),
            (State::Idealization, Action::Choice(value)) => self.on_idealization_answer(bank, value),
            (State::Result, Action::StartInterview) => {
                self.state = State::Interview;
                Turn::messages(vec![Message::Info(INTERVIEW_INTRO.to_owned()), self.current_prompt(bank)])
            }
            (State::Result, Action::Finish) => {
                self.state = State::Done;
                Turn::messages(vec![Message::Info(FAREWELL.to_owned())])
            }
            (State::Interview, Action::Text(text)) => self.on_interview_answer(bank, text),
            (State::Interview, Action::Stop) => self.cancel(),
            (State::Done | State::Cancelled, action) => {
                tracing::debug!(state = %self.state, action = %ActionKind::from(&action), "action after terminal state");
                Turn::default()
            }
            (_, Action::Cancel) => self.cancel(),
            (state, action) => {
                tracing::debug!(
                    state = %state,
                    action = %ActionKind::from(&action),
                    "rejected out-of-sequence action"
                );
                Turn::messages(vec![self.current_prompt(bank)])
            }
        }
    }

    fn cancel(&mut self) -> Turn {
        self.state = State::Cancelled;
        Turn::messages(vec![Message::Info(CANCELLED.to_owned())])
    }

    fn on_screening_answer(&mut self, bank: &QuestionBank, value: u8) -> Turn {
        if let Err(error) = self.session.record_answer(&bank.battery, AnswerKey::Screening, value) {
            tracing::debug!(error = &error as &dyn std::error::Error, "rejected screening answer");
            return Turn::messages(vec![self.current_prompt(bank)]);
        }
        if self.session.cursor(AnswerKey::Screening) >= bank.battery.screening.len() {
            self.state = State::Stages;
        }
        Turn::messages(vec![self.current_prompt(bank)])
    }

    fn on_stage_answer(&mut self, bank: &QuestionBank, value: u8) -> Turn {
        let stage = self.current_stage();
        if let Err(error) = self.session.record_answer(&bank.battery, AnswerKey::Stage(stage), value) {
            tracing::debug!(error = &error as &dyn std::error::Error, stage, "rejected stage answer");
            return Turn::messages(vec![self.current_prompt(bank)]);
        }
        if self.session.stage_cursor() >= bank.battery.stages.len() {
            self.state = State::Idealization;
        }
        Turn::messages(vec![self.current_prompt(bank)])
    }

    fn on_idealization_answer(&mut self, bank: &QuestionBank, value: bool) -> Turn {
        let recorded = self
            .session
            .record_answer(&bank.battery, AnswerKey::Idealization, u8::from(value));
        if let Err(error) = recorded {
            tracing::debug!(error = &error as &dyn std::error::Error, "rejected idealization answer");
            return Turn::messages(vec![self.current_prompt(bank)]);
        }
        if self.session.cursor(AnswerKey::Idealization) >= bank.battery.idealization.len() {
            return self.finish_battery(bank);
        }
        Turn::messages(vec![self.current_prompt(bank)])
    }

    fn finish_battery(&mut self, bank: &QuestionBank) -> Turn {
        let result = score::compute(&bank.battery, &self.session);
        tracing::info!(
            stage = result.stage,
            distortion = result.distortion,
            "battery complete"
        );
        let sums = result
            .sums
            .iter()
            .map(|(stage, sum)| (format!("B{stage}"), *sum))
            .collect();
        match interpret::resolve(&bank.interpretations, result.stage, &result.sums) {
            Ok(matched) => {
                self.state = State::Result;
                let summary = ResultSummary {
                    stage: result.stage,
                    sums,
                    distortion: result.distortion,
                    distorted: result.distorted(),
                    interpretation: Some(ResolvedInterpretation {
                        stage_title: matched.stage_title.to_owned(),
                        level_title: matched.level.title.clone(),
                        description: matched.level.description.clone(),
                        recommendations: matched.level.recommendations.clone(),
                    }),
                };
                Turn::messages(vec![Message::Summary(summary), self.current_prompt(bank)])
            }
            Err(error) => {
                // Data gap: never guess, end the conversation explicitly.
                tracing::warn!(
                    error = &error as &dyn std::error::Error,
                    stage = result.stage,
                    "no interpretation for computed result"
                );
                self.state = State::Done;
                let summary = ResultSummary {
                    stage: result.stage,
                    sums,
                    distortion: result.distortion,
                    distorted: result.distorted(),
                    interpretation: None,
                };
                Turn::messages(vec![
                    Message::Summary(summary),
                    Message::Info(RESULT_UNAVAILABLE.to_owned()),
                ])
            }
        }
    }

    fn on_interview_answer(&mut self, bank: &QuestionBank, text: String) -> Turn {
        if let Err(error) = self.session.record_open_answer(&bank.battery, text) {
            tracing::debug!(error = &error as &dyn std::error::Error, "rejected interview answer");
            return Turn::messages(vec![self.current_prompt(bank)]);
        }
        if self.session.interview_cursor() >= bank.battery.interview.len() {
            self.state = State::Done;
            return Turn {
                messages: vec![
                    Message::Info(INTERVIEW_DONE.to_owned()),
                    Message::Info(FAREWELL.to_owned()),
                ],
                transcript: Some(self.session.open_answers().to_vec()),
            };
        }
        Turn::messages(vec![self.current_prompt(bank)])
    }

    /// Stage key currently being collected, 1..=7.
    fn current_stage(&self) -> u8 {
        u8::try_from(self.session.stage_cursor() + 1).unwrap_or(u8::MAX)
    }

    /// The prompt for the current cursor position; also used to re-emit
    /// after a rejected action.
    fn current_prompt(&self, bank: &QuestionBank) -> Message {
        let battery = &bank.battery;
        match self.state {
            State::Screening => {
                let index = self.session.cursor(AnswerKey::Screening);
                let total = battery.screening.len();
                let text = &battery.screening[index.min(total - 1)].text;
                Message::Prompt(Prompt {
                    text: format!("A{}/{total}\n{text}", index + 1),
                    options: SCALE_OPTIONS.iter().map(ToString::to_string).collect(),
                })
            }
            State::Stages => {
                let stage = self.current_stage();
                let Some(block) = battery.stage(stage) else {
                    // unreachable with a validated battery
                    tracing::error!(stage, "stage block missing from battery");
                    return Message::Info(RESULT_UNAVAILABLE.to_owned());
                };
                let position = self.session.stage_position();
                let total = block.questions.len();
                let text = &block.questions[position.min(total - 1)].text;
                Message::Prompt(Prompt {
                    text: format!("B{stage}-{}/{total}\n{text}", position + 1),
                    options: SCALE_OPTIONS.iter().map(ToString::to_string).collect(),
                })
            }
            State::Idealization => {
                let index = self.session.cursor(AnswerKey::Idealization);
                let total = battery.idealization.len();
                let text = &battery.idealization[index.min(total - 1)].text;
                Message::Prompt(Prompt {
                    text: format!("C{}/{total}\n{text}", index + 1),
                    options: BOOL_OPTIONS.iter().map(ToString::to_string).collect(),
                })
            }
            State::Result => Message::Prompt(Prompt {
                text: RESULT_CHOICE.to_owned(),
                options: RESULT_OPTIONS.iter().map(ToString::to_string).collect(),
            }),
            State::Interview => {
                let index = self.session.interview_cursor();
                let total = battery.interview.len();
                let text = &battery.interview[index.min(total - 1)].text;
                Message::Prompt(Prompt {
                    text: format!("D{}/{total}\n{text}", index + 1),
                    options: vec![],
                })
            }
            State::Done | State::Cancelled => Message::Info(FAREWELL.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etap_config::battery::{Battery, BooleanQuestion, OpenQuestion, ScaledQuestion, StageBlock};
    use etap_config::interpretation::{Interpretation, InterpretationCatalog, Level};
    use indexmap::IndexMap;
    use std::sync::LazyLock;

    fn scaled(id: &str) -> ScaledQuestion {
        ScaledQuestion {
            id: id.to_owned(),
            text: id.to_owned(),
        }
    }

    fn level(id: &str, min: u32, max: u32) -> Level {
        Level {
            id: id.to_owned(),
            title: id.to_owned(),
            min,
            max,
            description: format!("{id} description"),
            recommendations: vec![],
        }
    }

    /// 8 screening items, 8 questions per stage, 9 idealization items,
    /// 3 interview prompts; interpretations for stages 0..=7.
    static BANK: LazyLock<QuestionBank> = LazyLock::new(|| {
        let stages: IndexMap<u8, StageBlock> = (1..=7)
            .map(|stage| {
                (
                    stage,
                    StageBlock {
                        stage,
                        title: format!("stage {stage}"),
                        questions: (1..=8).map(|i| scaled(&format!("b{stage}-{i}"))).collect(),
                    },
                )
            })
            .collect();
        let marks = [
            Some(true),
            Some(true),
            Some(true),
            Some(false),
            Some(false),
            Some(true),
            Some(true),
            Some(false),
            Some(true),
        ];
        let battery = Battery {
            battery_id: "test".to_owned(),
            title: "test".to_owned(),
            screening: (1..=8).map(|i| scaled(&format!("a{i}"))).collect(),
            stages,
            idealization: marks
                .iter()
                .enumerate()
                .map(|(i, mark)| BooleanQuestion {
                    id: format!("c{i}"),
                    text: format!("c{i}"),
                    ideal_when: *mark,
                })
                .collect(),
            interview: (1..=3)
                .map(|i| OpenQuestion {
                    id: format!("d{i}"),
                    text: format!("d{i}"),
                })
                .collect(),
        };
        let interpretations = InterpretationCatalog {
            stages: (0..=7)
                .map(|stage| {
                    (
                        stage,
                        Interpretation {
                            stage,
                            title: format!("stage {stage}"),
                            levels: vec![level("whole", 0, 99)],
                        },
                    )
                })
                .collect(),
        };
        let bank = QuestionBank {
            battery,
            interpretations,
        };
        bank.validate().unwrap();
        bank
    });

    fn first_prompt_text(turn: &Turn) -> &str {
        turn.messages
            .iter()
            .find_map(|message| match message {
                Message::Prompt(prompt) => Some(prompt.text.as_str()),
                _ => None,
            })
            .expect("turn has no prompt")
    }

    fn answer_block(conversation: &mut Conversation, count: usize, action: &Action) {
        for _ in 0..count {
            conversation.handle(&BANK, action.clone());
        }
    }

    #[test_log::test]
    fn begin_emits_greeting_and_first_screening_prompt() {
        let mut conversation = Conversation::new();
        let turn = conversation.handle(&BANK, Action::Begin);
        assert_eq!(turn.messages.len(), 2);
        assert!(first_prompt_text(&turn).starts_with("A1/8"));
        assert_eq!(conversation.state(), State::Screening);
    }

    #[test_log::test]
    fn begin_overwrites_prior_progress() {
        let mut conversation = Conversation::new();
        conversation.handle(&BANK, Action::Begin);
        answer_block(&mut conversation, 8, &Action::Scale(2));
        assert_eq!(conversation.state(), State::Stages);
        let turn = conversation.handle(&BANK, Action::Begin);
        assert_eq!(conversation.state(), State::Screening);
        assert!(first_prompt_text(&turn).starts_with("A1/8"));
    }

    #[test_log::test]
    fn eight_screening_answers_move_to_stage_one() {
        let mut conversation = Conversation::new();
        conversation.handle(&BANK, Action::Begin);
        for _ in 0..7 {
            let turn = conversation.handle(&BANK, Action::Scale(2));
            assert_eq!(conversation.state(), State::Screening);
            assert!(first_prompt_text(&turn).starts_with('A'));
        }
        let turn = conversation.handle(&BANK, Action::Scale(2));
        assert_eq!(conversation.state(), State::Stages);
        assert!(first_prompt_text(&turn).starts_with("B1-1/8"));
    }

    #[test_log::test]
    fn out_of_sequence_action_reprompts_without_mutation() {
        let mut conversation = Conversation::new();
        conversation.handle(&BANK, Action::Begin);
        conversation.handle(&BANK, Action::Scale(1));
        // a boolean answer does not belong to the screening block
        let turn = conversation.handle(&BANK, Action::Choice(true));
        assert_eq!(conversation.state(), State::Screening);
        assert!(first_prompt_text(&turn).starts_with("A2/8"));
    }

    #[test_log::test]
    fn out_of_range_scale_value_reprompts() {
        let mut conversation = Conversation::new();
        conversation.handle(&BANK, Action::Begin);
        let turn = conversation.handle(&BANK, Action::Scale(5));
        assert!(first_prompt_text(&turn).starts_with("A1/8"));
    }

    fn complete_battery(conversation: &mut Conversation, stage_value: u8) {
        conversation.handle(&BANK, Action::Begin);
        answer_block(conversation, 8, &Action::Scale(2));
        answer_block(conversation, 56, &Action::Scale(stage_value));
        answer_block(conversation, 9, &Action::Choice(false));
    }

    #[test_log::test]
    fn completed_battery_emits_summary_and_result_options() {
        let mut conversation = Conversation::new();
        conversation.handle(&BANK, Action::Begin);
        answer_block(&mut conversation, 8, &Action::Scale(2));
        answer_block(&mut conversation, 56, &Action::Scale(4));
        for _ in 0..8 {
            conversation.handle(&BANK, Action::Choice(true));
        }
        let turn = conversation.handle(&BANK, Action::Choice(true));
        assert_eq!(conversation.state(), State::Result);
        let Message::Summary(summary) = &turn.messages[0] else {
            panic!("expected a summary message");
        };
        // every stage sums to 32 with all-4 answers
        assert_eq!(summary.stage, 7);
        assert_eq!(summary.sums[0], ("B1".to_owned(), 32));
        // six idealized answers trigger the warning
        assert_eq!(summary.distortion, 6);
        assert!(summary.distorted);
        assert!(summary.interpretation.is_some());
    }

    #[test_log::test]
    fn interview_completion_yields_transcript_and_done() {
        let mut conversation = Conversation::new();
        complete_battery(&mut conversation, 4);
        conversation.handle(&BANK, Action::StartInterview);
        assert_eq!(conversation.state(), State::Interview);
        conversation.handle(&BANK, Action::Text("one".to_owned()));
        conversation.handle(&BANK, Action::Text("two".to_owned()));
        let turn = conversation.handle(&BANK, Action::Text("three".to_owned()));
        assert_eq!(conversation.state(), State::Done);
        assert_eq!(
            turn.transcript,
            Some(vec!["one".to_owned(), "two".to_owned(), "three".to_owned()])
        );
    }

    #[test_log::test]
    fn stop_mid_interview_cancels_without_transcript() {
        let mut conversation = Conversation::new();
        complete_battery(&mut conversation, 4);
        conversation.handle(&BANK, Action::StartInterview);
        conversation.handle(&BANK, Action::Text("partial".to_owned()));
        let turn = conversation.handle(&BANK, Action::Stop);
        assert_eq!(conversation.state(), State::Cancelled);
        assert_eq!(turn.transcript, None);
    }

    #[test_log::test]
    fn finish_on_result_screen_ends_the_conversation() {
        let mut conversation = Conversation::new();
        complete_battery(&mut conversation, 4);
        let turn = conversation.handle(&BANK, Action::Finish);
        assert_eq!(conversation.state(), State::Done);
        assert_eq!(turn.messages, vec![Message::Info(FAREWELL.to_owned())]);
    }

    #[test_log::test]
    fn cancel_is_accepted_from_any_active_state() {
        let mut conversation = Conversation::new();
        conversation.handle(&BANK, Action::Begin);
        conversation.handle(&BANK, Action::Scale(1));
        conversation.handle(&BANK, Action::Cancel);
        assert_eq!(conversation.state(), State::Cancelled);
        assert!(conversation.is_terminal());
    }

    #[test_log::test]
    fn terminal_states_ignore_further_input() {
        let mut conversation = Conversation::new();
        conversation.handle(&BANK, Action::Cancel);
        let turn = conversation.handle(&BANK, Action::Scale(3));
        assert_eq!(turn, Turn::default());
        assert_eq!(conversation.state(), State::Cancelled);
    }

    #[test_log::test]
    fn missing_interpretation_terminates_with_unavailable_notice() {
        let bank = QuestionBank {
            battery: BANK.battery.clone(),
            interpretations: InterpretationCatalog {
                // no data for stage 0
                stages: IndexMap::new(),
            },
        };
        let mut conversation = Conversation::new();
        conversation.handle(&bank, Action::Begin);
        answer_block_with(&mut conversation, &bank, 8, &Action::Scale(0));
        answer_block_with(&mut conversation, &bank, 56, &Action::Scale(0));
        answer_block_with(&mut conversation, &bank, 8, &Action::Choice(false));
        let turn = conversation.handle(&bank, Action::Choice(false));
        assert_eq!(conversation.state(), State::Done);
        assert!(matches!(&turn.messages[0], Message::Summary(summary) if summary.interpretation.is_none()));
        assert_eq!(turn.messages[1], Message::Info(RESULT_UNAVAILABLE.to_owned()));
    }

    fn answer_block_with(conversation: &mut Conversation, bank: &QuestionBank, count: usize, action: &Action) {
        for _ in 0..count {
            conversation.handle(bank, action.clone());
        }
    }
}
