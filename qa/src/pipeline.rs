//! Read → analyze → save, run once.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::checklist::read_checklist;
use crate::model::LanguageModel;
use crate::prompt::render_analysis_prompt;
use crate::report::save_report;

/// Values passed between pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaState {
    pub qa_text: String,
    pub report: String,
}

/// Produce the release report for `checklist` and write it to `output`.
pub fn generate_report<M: LanguageModel>(
    model: &M,
    checklist: &Path,
    output: &Path,
) -> Result<QaState> {
    let qa_text = read_checklist(checklist)?;

    let prompt = render_analysis_prompt(&qa_text)?;
    let report = model.complete(&prompt).context("analyze checklist")?;

    save_report(output, &report)?;
    info!(path = %output.display(), "QA decision saved");
    Ok(QaState { qa_text, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::MISSING_CHECKLIST;
    use anyhow::bail;
    use std::cell::RefCell;
    use std::fs;

    struct FakeModel {
        reply: Option<String>,
        prompts: RefCell<Vec<String>>,
    }

    impl FakeModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl LanguageModel for FakeModel {
        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => bail!("service unavailable"),
            }
        }
    }

    #[test]
    fn missing_checklist_still_produces_report() {
        let temp = tempfile::tempdir().expect("tempdir");
        let output = temp.path().join("qa_output/qa_decision.txt");
        let model = FakeModel::replying("FINAL DECISION → FIX BEFORE RELEASE");

        let state =
            generate_report(&model, &temp.path().join("release_qa.txt"), &output).expect("report");

        assert_eq!(state.qa_text, MISSING_CHECKLIST);
        assert!(model.prompts.borrow()[0].contains(MISSING_CHECKLIST));
        let written = fs::read_to_string(&output).expect("read");
        assert!(!written.is_empty());
        assert_eq!(written, "FINAL DECISION → FIX BEFORE RELEASE");
    }

    #[test]
    fn checklist_answers_reach_the_model() {
        let temp = tempfile::tempdir().expect("tempdir");
        let checklist = temp.path().join("release_qa.txt");
        fs::write(&checklist, "Playback survives Doze? UNSURE").expect("write");
        let output = temp.path().join("out.txt");
        let model = FakeModel::replying("PLAYBACK RELIABILITY → RISK");

        generate_report(&model, &checklist, &output).expect("report");

        assert!(model.prompts.borrow()[0].contains("Playback survives Doze? UNSURE"));
        assert_eq!(
            fs::read_to_string(&output).expect("read"),
            "PLAYBACK RELIABILITY → RISK"
        );
    }

    #[test]
    fn model_failure_writes_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let output = temp.path().join("qa_output/qa_decision.txt");
        let model = FakeModel {
            reply: None,
            prompts: RefCell::new(Vec::new()),
        };

        let err = generate_report(&model, &temp.path().join("missing.txt"), &output).unwrap_err();

        assert!(format!("{err:#}").contains("service unavailable"));
        assert!(!output.exists());
    }
}
