// tests/session_flow_test.rs - Integration test: full session flow with mock provider and store

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use beergame_coach::coach::{CoachService, CoachingMode, NoticeLevel, Session, SessionEvent};
use beergame_coach::infra::errors::CoachError;
use beergame_coach::persistence::{PersistenceAdapter, SaveOutcome};
use beergame_coach::provider::fallback::ResponseGenerator;
use beergame_coach::provider::*;
use beergame_coach::storage::BlobStore;

/// Answers from a queue per call, recording every request it sees.
struct MockProvider {
    rejected_models: Vec<String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    fn answering() -> Self {
        Self {
            rejected_models: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn rejecting(models: &[&str]) -> Self {
        Self {
            rejected_models: models.iter().map(|m| m.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn id(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CoachError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.rejected_models.contains(&request.model) {
            return Err(CoachError::Rejected {
                model: request.model,
                message: "unsupported parameter".into(),
            });
        }
        let n = request.input.iter().filter(|m| m.role == Role::User).count();
        Ok(ChatResponse {
            content: format!("reply {n} from {}", request.model),
            usage: TokenUsage::default(),
        })
    }
}

/// Keeps every uploaded file's name and contents in memory.
#[derive(Default)]
struct RecordingStore {
    uploads: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingStore {
    fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for RecordingStore {
    fn name(&self) -> &str {
        "memory://transcripts"
    }

    async fn upload_file(&self, blob_name: &str, local_path: &Path) -> Result<(), CoachError> {
        if self.fail {
            return Err(CoachError::storage("memory", "bucket unavailable"));
        }
        let body = std::fs::read_to_string(local_path)?;
        self.uploads
            .lock()
            .unwrap()
            .push((blob_name.to_string(), body));
        Ok(())
    }
}

struct Harness {
    service: CoachService,
    provider: Arc<MockProvider>,
    store: Arc<RecordingStore>,
    scratch: TempDir,
}

fn harness(provider: MockProvider, store: RecordingStore) -> Harness {
    let provider = Arc::new(provider);
    let store = Arc::new(store);
    let scratch = TempDir::new().unwrap();
    let generator = ResponseGenerator::new(provider.clone(), "gpt-5-mini", "gpt-4o-mini");
    let persistence = PersistenceAdapter::new(store.clone(), scratch.path().to_path_buf());
    Harness {
        service: CoachService::new(generator, persistence),
        provider,
        store,
        scratch,
    }
}

fn sections() -> Vec<String> {
    vec!["OPMGT 301 A".into(), "OPMGT 301 B".into()]
}

async fn ready_quantitative(h: &Harness) -> Session {
    let mut session = Session::new(CoachingMode::Quantitative, &sections());
    for event in [
        SessionEvent::SelectSection {
            section: "OPMGT 301 A".into(),
        },
        SessionEvent::EnterParticipant {
            participant_id: "12".into(),
        },
        SessionEvent::SelectRole {
            role: "Retailer".into(),
        },
    ] {
        let turn = h.service.dispatch(&mut session, event).await;
        assert!(turn.notices.is_empty(), "setup notices: {:?}", turn.notices);
    }
    session
}

fn say(text: &str) -> SessionEvent {
    SessionEvent::SubmitMessage { text: text.into() }
}

#[tokio::test]
async fn test_quantitative_exchange_autosaves_transcript() {
    let h = harness(MockProvider::answering(), RecordingStore::default());
    let mut session = ready_quantitative(&h).await;

    let turn = h
        .service
        .dispatch(&mut session, say("Demand is 8, inventory 4. How much should I order?"))
        .await;

    assert_eq!(turn.reply.as_deref(), Some("reply 1 from gpt-5-mini"));
    assert!(session.role_locked());
    assert_eq!(
        turn.saved.as_ref().and_then(|o| o.file_name()),
        Some("beergame_quantitative_OPMGT_301_A_P12_Retailer.csv")
    );

    let uploads = h.store.uploads();
    assert_eq!(uploads.len(), 1);
    let (name, body) = &uploads[0];
    assert_eq!(name, "beergame_quantitative_OPMGT_301_A_P12_Retailer.csv");

    let mut lines = body.lines();
    assert_eq!(lines.next(), Some("role,content"));
    assert!(body.contains("user,\"Demand is 8, inventory 4. How much should I order?\""));
    assert!(body.contains("assistant,reply 1 from gpt-5-mini"));
    assert!(body.contains("Mode,BeerGameQuantitative"));
    assert!(body.contains("Section,OPMGT 301 A"));
    assert!(body.contains("Participant Role,Retailer"));
    assert!(body.contains("Start Time,"));
    assert!(body.contains("Duration,0 days 00:00:"));
}

#[tokio::test]
async fn test_request_carries_role_framed_system_prompt() {
    let h = harness(MockProvider::answering(), RecordingStore::default());
    let mut session = ready_quantitative(&h).await;

    h.service.dispatch(&mut session, say("hello")).await;

    let requests = h.provider.requests();
    assert_eq!(requests.len(), 1);
    let input = &requests[0].input;
    assert_eq!(input[0].role, Role::System);
    assert!(input[0].content.contains("User role in Beer Game: Retailer."));
    // Welcome message and the new user turn follow the system prompt.
    assert_eq!(input.len(), 3);
    assert_eq!(input[2], Message::user("hello"));
}

#[tokio::test]
async fn test_transcript_grows_by_two_per_exchange() {
    let h = harness(MockProvider::answering(), RecordingStore::default());
    let mut session = ready_quantitative(&h).await;

    for n in 1..=3 {
        h.service
            .dispatch(&mut session, say(&format!("round {n}")))
            .await;
        assert_eq!(session.messages().len(), 1 + 2 * n);
    }
    assert_eq!(session.exchange_count(), 3);

    let uploads = h.store.uploads();
    assert_eq!(uploads.len(), 3);
    // Same identifiers, same blob: each save overwrites the previous one.
    assert!(uploads.iter().all(|(name, _)| name == &uploads[0].0));
}

#[tokio::test]
async fn test_rejection_falls_back_once_with_single_warning() {
    let h = harness(
        MockProvider::rejecting(&["gpt-5-mini"]),
        RecordingStore::default(),
    );
    let mut session = ready_quantitative(&h).await;

    let turn = h.service.dispatch(&mut session, say("help")).await;

    assert_eq!(turn.reply.as_deref(), Some("reply 1 from gpt-4o-mini"));
    let warnings: Vec<_> = turn
        .notices
        .iter()
        .filter(|n| n.level == NoticeLevel::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].text,
        "Model 'gpt-5-mini' failed for this request. Retrying with 'gpt-4o-mini'."
    );

    let requests = h.provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].input, requests[1].input);
    assert_eq!(session.messages().len(), 3);
}

#[tokio::test]
async fn test_both_models_rejected_keeps_user_message() {
    let h = harness(
        MockProvider::rejecting(&["gpt-5-mini", "gpt-4o-mini"]),
        RecordingStore::default(),
    );
    let mut session = ready_quantitative(&h).await;

    let turn = h.service.dispatch(&mut session, say("help")).await;

    assert!(turn.reply.is_none());
    assert!(turn.saved.is_none());
    assert!(turn.notices.iter().any(|n| n.level == NoticeLevel::Error));
    assert_eq!(h.provider.requests().len(), 2);
    assert_eq!(session.messages().last(), Some(&Message::user("help")));
    assert!(session.role_locked());
    assert!(h.store.uploads().is_empty());
}

#[tokio::test]
async fn test_chat_blocked_until_participant_entered() {
    let h = harness(MockProvider::answering(), RecordingStore::default());
    let mut session = Session::new(CoachingMode::Quantitative, &sections());

    let turn = h
        .service
        .dispatch(
            &mut session,
            SessionEvent::SelectRole {
                role: "Retailer".into(),
            },
        )
        .await;
    assert_eq!(turn.notices.len(), 1);
    assert_eq!(turn.notices[0].level, NoticeLevel::Warning);

    let turn = h.service.dispatch(&mut session, say("hello")).await;
    assert!(turn.reply.is_none());
    assert_eq!(turn.notices[0].level, NoticeLevel::Info);
    assert!(h.provider.requests().is_empty());
    assert_eq!(session.messages().len(), 1);
}

#[tokio::test]
async fn test_manual_save_without_identifiers_reports_missing_fields() {
    let h = harness(MockProvider::answering(), RecordingStore::default());
    let mut session = Session::new(CoachingMode::Quantitative, &sections());

    let turn = h
        .service
        .dispatch(&mut session, SessionEvent::EndConversation)
        .await;

    assert_eq!(turn.saved, Some(SaveOutcome::MissingRequiredFields));
    assert_eq!(turn.notices[0].level, NoticeLevel::Error);
    assert!(h.store.uploads().is_empty());
}

#[tokio::test]
async fn test_locked_role_cannot_change() {
    let h = harness(MockProvider::answering(), RecordingStore::default());
    let mut session = ready_quantitative(&h).await;
    h.service.dispatch(&mut session, say("hi")).await;

    let turn = h
        .service
        .dispatch(
            &mut session,
            SessionEvent::SelectRole {
                role: "Factory".into(),
            },
        )
        .await;

    assert_eq!(session.role(), "Retailer");
    assert_eq!(session.messages().len(), 3);
    assert_eq!(turn.notices[0].level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_qualitative_saves_only_when_asked() {
    let h = harness(MockProvider::answering(), RecordingStore::default());
    let mut session = Session::new(CoachingMode::Qualitative, &sections());
    for event in [
        SessionEvent::EnterParticipant {
            participant_id: "7".into(),
        },
        SessionEvent::SelectRole {
            role: "Wholesaler".into(),
        },
    ] {
        h.service.dispatch(&mut session, event).await;
    }

    let turn = h.service.dispatch(&mut session, say("why is my backlog growing?")).await;
    assert!(turn.reply.is_some());
    assert!(turn.saved.is_none());
    assert!(!session.role_locked());

    let turn = h
        .service
        .dispatch(&mut session, SessionEvent::EndConversation)
        .await;
    assert_eq!(
        turn.saved.as_ref().and_then(|o| o.file_name()),
        Some("beergame_qualitative_P7_Wholesaler.csv")
    );
    assert_eq!(turn.notices[0].level, NoticeLevel::Success);

    let uploads = h.store.uploads();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].1.contains("Mode,BeerGameQualitative"));
    assert!(!uploads[0].1.contains("Section,"));
}

#[tokio::test]
async fn test_store_failure_keeps_session_and_cleans_scratch() {
    let h = harness(
        MockProvider::answering(),
        RecordingStore {
            fail: true,
            ..Default::default()
        },
    );
    let mut session = ready_quantitative(&h).await;

    let turn = h.service.dispatch(&mut session, say("hi")).await;

    assert!(turn.reply.is_some());
    assert!(matches!(turn.saved, Some(SaveOutcome::Failed(_))));
    assert!(turn.notices.iter().any(|n| n.text.starts_with("Autosave failed")));
    assert_eq!(session.messages().len(), 3);
    assert_eq!(std::fs::read_dir(h.scratch.path()).unwrap().count(), 0);
}
