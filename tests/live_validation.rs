use std::{env, sync::Once, time::Duration};

use studypack::{
    config,
    pipeline::{EnabledTasks, StudyRequest, StudyService, TaskOptions},
};

static INIT: Once = Once::new();

fn set_default_env(key: &str, value: &str) {
    let needs_value = env::var(key).map(|v| v.trim().is_empty()).unwrap_or(true);
    if needs_value {
        // SAFETY: Tests run serially via Once and we intentionally mutate process env.
        unsafe {
            env::set_var(key, value);
        }
    }
}

fn init_env_once() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
        set_default_env("STUDYPACK_CHUNK_SIZE", "600");
        set_default_env("STUDYPACK_REQUEST_DELAY_MS", "1000");
    });
}

const PHOTOSYNTHESIS: &str = "Photosynthesis is the process by which green plants convert light \
energy into chemical energy. It takes place in the chloroplasts, which contain the pigment \
chlorophyll. The light-dependent reactions occur in the thylakoid membranes and produce ATP and \
NADPH while splitting water and releasing oxygen. The Calvin cycle occurs in the stroma and uses \
ATP and NADPH to fix carbon dioxide into glucose. Factors limiting the rate of photosynthesis \
include light intensity, carbon dioxide concentration, and temperature.";

#[tokio::test]
#[ignore = "Requires live Gemini API key"]
async fn live_gemini_generates_every_task() {
    init_env_once();
    let config = config::load_config().expect("GEMINI_API_KEY must be set for live validation");
    assert!(config.request_delay >= Duration::from_millis(1000));

    let service = StudyService::new(config).expect("Gemini client");
    let run = service
        .process_text(
            PHOTOSYNTHESIS,
            StudyRequest {
                tasks: EnabledTasks::ALL,
                options: TaskOptions {
                    quiz_count: 4,
                    flashcard_count: 4,
                    ..TaskOptions::default()
                },
            },
        )
        .await
        .expect("live run");

    assert!(run.failures.is_empty(), "live run failures: {:?}", run.failures);
    assert_eq!(run.results.summaries.len(), run.section_count);
    assert!(!run.results.quizzes.is_empty(), "expected quiz questions");
    assert!(
        run.results
            .quizzes
            .iter()
            .all(|question| question.answer_index < question.options.len())
    );
    assert!(!run.results.flashcards.is_empty(), "expected flashcards");
}
