//! Judge stream relay
//!
//! One reader task pulls the upstream body and tees every chunk two ways:
//! first into an unbounded channel feeding the decoder, then into a bounded
//! channel that becomes the caller's response body. A slow caller therefore
//! slows upstream reads, but decoding never holds back relaying.
//!
//! A second task decodes the copy and drives [`SubmissionRun`], which persists
//! the first `Done` report and nothing else.

use std::{convert::Infallible, fmt, pin::Pin, sync::Arc};

use axum::body::Bytes;
use futures::{Stream, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use uuid::Uuid;

use super::{
    decoder::{DecodeError, EventDecoder},
    message::JudgeMessage,
};
use crate::{
    catalog::ScoringConfig,
    services::result_writer::{Graded, NewSubmission, ResultWriter},
};

/// Body stream handed to the caller; carries the upstream bytes unchanged
pub type RelayStream = Pin<Box<dyn Stream<Item = Result<Bytes, Infallible>> + Send>>;

/// Everything needed to store the submission once the judge reports back
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub task: i32,
    pub code: String,
    pub language: String,
    pub scoring: ScoringConfig,
}

/// Why a run ended without a terminal message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interruption {
    EndOfStream,
    UpstreamBroken(String),
    CallerGone,
}

impl fmt::Display for Interruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream => write!(f, "judge stream ended without a terminal message"),
            Self::UpstreamBroken(e) => write!(f, "judge stream broke: {e}"),
            Self::CallerGone => write!(f, "caller disconnected"),
        }
    }
}

/// Final state of one relayed submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Persisted(Uuid),
    PersistFailed,
    JudgeFailed(String),
    Incomplete(Interruption),
}

/// A running relay
pub struct RelayHandle {
    pub body: RelayStream,
    pub outcome: JoinHandle<RunOutcome>,
}

enum Feed {
    Chunk(Bytes),
    Broken(String),
    CallerGone,
}

/// Start relaying `upstream`
///
/// `capacity` bounds how many chunks may wait for the caller.
pub fn spawn<S, E>(
    upstream: S,
    pending: PendingSubmission,
    writer: Arc<dyn ResultWriter>,
    capacity: usize,
) -> RelayHandle
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let (relay_tx, relay_rx) = mpsc::channel::<Bytes>(capacity.max(1));
    let (feed_tx, feed_rx) = mpsc::unbounded_channel::<Feed>();

    tokio::spawn(async move {
        let mut upstream = std::pin::pin!(upstream);

        loop {
            let next = tokio::select! {
                _ = relay_tx.closed() => {
                    let _ = feed_tx.send(Feed::CallerGone);
                    break;
                }
                next = upstream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    let _ = feed_tx.send(Feed::Chunk(chunk.clone()));
                    if relay_tx.send(chunk).await.is_err() {
                        let _ = feed_tx.send(Feed::CallerGone);
                        break;
                    }
                }
                Some(Err(e)) => {
                    let _ = feed_tx.send(Feed::Broken(e.to_string()));
                    break;
                }
                None => break,
            }
        }
        // Dropping the upstream here closes the judge connection
    });

    let outcome = tokio::spawn(drive(feed_rx, SubmissionRun::new(pending, writer)));

    let body = futures::stream::unfold(relay_rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (Ok(chunk), rx))
    });

    RelayHandle {
        body: Box::pin(body),
        outcome,
    }
}

async fn drive(mut feed: mpsc::UnboundedReceiver<Feed>, mut run: SubmissionRun) -> RunOutcome {
    let mut decoder = EventDecoder::new();
    let mut interruption = Interruption::EndOfStream;

    while let Some(item) = feed.recv().await {
        match item {
            Feed::Chunk(chunk) => {
                for decoded in decoder.feed(&chunk) {
                    run.on_decoded(decoded).await;
                }
            }
            Feed::Broken(reason) => interruption = Interruption::UpstreamBroken(reason),
            Feed::CallerGone => interruption = Interruption::CallerGone,
        }
    }

    if let Some(decoded) = decoder.finish() {
        run.on_decoded(decoded).await;
    }

    run.finish(interruption)
}

enum RunState {
    Decoding(PendingSubmission),
    Persisted(Uuid),
    PersistFailed,
    JudgeFailed(String),
}

/// Terminal handling for one submission
///
/// Leaves `Decoding` at most once. Terminal messages arriving afterwards are
/// logged and ignored, so a report is never written twice.
pub struct SubmissionRun {
    state: RunState,
    writer: Arc<dyn ResultWriter>,
}

impl SubmissionRun {
    pub fn new(pending: PendingSubmission, writer: Arc<dyn ResultWriter>) -> Self {
        Self {
            state: RunState::Decoding(pending),
            writer,
        }
    }

    async fn on_decoded(&mut self, decoded: Result<JudgeMessage, DecodeError>) {
        match decoded {
            Ok(message) => self.on_message(message).await,
            Err(e) => tracing::warn!(error = %e, "Undecodable judge event"),
        }
    }

    pub async fn on_message(&mut self, message: JudgeMessage) {
        let RunState::Decoding(pending) = &self.state else {
            if message.is_terminal() {
                tracing::warn!(kind = message.kind(), "Ignoring terminal message after run completed");
            }
            return;
        };

        match message {
            JudgeMessage::Done { report } => {
                let submission = NewSubmission {
                    user_id: pending.user_id,
                    contest_id: pending.contest_id,
                    task: pending.task,
                    code: pending.code.clone(),
                    language: pending.language.clone(),
                    graded: Graded::Report {
                        report,
                        scoring: pending.scoring,
                    },
                };

                self.state = match self.writer.persist(submission).await {
                    Ok(id) => RunState::Persisted(id),
                    Err(e) => {
                        tracing::error!(error = %e, "Judged submission was lost");
                        RunState::PersistFailed
                    }
                };
            }
            JudgeMessage::Error { reason } => {
                tracing::warn!(reason = %reason, "Judge reported an error");
                self.state = RunState::JudgeFailed(reason);
            }
            progress => tracing::debug!(kind = progress.kind(), "Judge progress"),
        }
    }

    pub fn finish(self, interruption: Interruption) -> RunOutcome {
        match self.state {
            RunState::Persisted(id) => RunOutcome::Persisted(id),
            RunState::PersistFailed => RunOutcome::PersistFailed,
            RunState::JudgeFailed(reason) => RunOutcome::JudgeFailed(reason),
            RunState::Decoding(pending) => {
                match &interruption {
                    Interruption::CallerGone => tracing::warn!(
                        user_id = %pending.user_id,
                        task = pending.task,
                        "Caller disconnected mid-judging; the judge is not told to stop"
                    ),
                    _ => tracing::warn!(
                        user_id = %pending.user_id,
                        task = pending.task,
                        reason = %interruption,
                        "Submission ended without a result"
                    ),
                }
                RunOutcome::Incomplete(interruption)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::result_writer::{MockResultWriter, PersistenceError};

    const SCORING: ScoringConfig = ScoringConfig {
        subtask_score: 50.0,
        test_score: 10.0,
        answer_score: 0.0,
    };

    const DONE: &str = concat!(
        r#"data: {"type":"Done","report":{"task":"WrongAnswer","subtasks":["Accepted","WrongAnswer"],"#,
        r#""tests":[[{"verdict":"Accepted","resource_usage":{"memory":1,"user-time":{"secs":0,"nanos":0},"sys-time":{"secs":0,"nanos":0}}}],"#,
        r#"[{"verdict":"WrongAnswer","resource_usage":{"memory":1,"user-time":{"secs":0,"nanos":0},"sys-time":{"secs":0,"nanos":0}}}]]}}"#,
        "\n\n"
    );

    fn pending() -> PendingSubmission {
        PendingSubmission {
            user_id: Uuid::new_v4(),
            contest_id: Uuid::new_v4(),
            task: 1,
            code: "print(3)".to_string(),
            language: "Python".to_string(),
            scoring: SCORING,
        }
    }

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
        let parts: Vec<_> = parts.iter().map(|p| Ok(Bytes::from(p.to_string()))).collect();
        futures::stream::iter(parts)
    }

    async fn collect(body: RelayStream) -> Vec<u8> {
        body.map(|chunk| chunk.unwrap_or_else(|e| match e {}))
            .collect::<Vec<_>>()
            .await
            .concat()
    }

    #[tokio::test]
    async fn test_error_is_relayed_and_not_persisted() {
        let mut writer = MockResultWriter::new();
        writer.expect_persist().times(0);

        let input = [
            "data: {\"type\":\"Queued\",\"tests\":2}\n\n",
            "data: {\"type\":\"Error\",\"reason\":\"boom\"}\n\n",
        ];
        let handle = spawn(chunks(&input), pending(), Arc::new(writer), 4);

        assert_eq!(collect(handle.body).await, input.concat().into_bytes());
        assert_eq!(
            handle.outcome.await.unwrap(),
            RunOutcome::JudgeFailed("boom".to_string())
        );
    }

    #[tokio::test]
    async fn test_done_split_across_chunks_is_persisted_once() {
        let id = Uuid::new_v4();
        let mut writer = MockResultWriter::new();
        writer
            .expect_persist()
            .withf(|s| s.task == 1 && s.language == "Python" && s.graded.score() == 60.0)
            .times(1)
            .returning(move |_| Ok(id));

        let (head, tail) = DONE.split_at(57);
        let input = ["data: {\"type\":\"Compiling\"}\n\n", head, tail];
        let handle = spawn(chunks(&input), pending(), Arc::new(writer), 1);

        assert_eq!(collect(handle.body).await, input.concat().into_bytes());
        assert_eq!(handle.outcome.await.unwrap(), RunOutcome::Persisted(id));
    }

    #[tokio::test]
    async fn test_second_terminal_is_ignored() {
        let id = Uuid::new_v4();
        let mut writer = MockResultWriter::new();
        writer.expect_persist().times(1).returning(move |_| Ok(id));

        let error = "data: {\"type\":\"Error\",\"reason\":\"late\"}\n\n";
        let handle = spawn(chunks(&[DONE, DONE, error]), pending(), Arc::new(writer), 4);

        collect(handle.body).await;
        assert_eq!(handle.outcome.await.unwrap(), RunOutcome::Persisted(id));
    }

    #[tokio::test]
    async fn test_malformed_event_does_not_stop_the_run() {
        let id = Uuid::new_v4();
        let mut writer = MockResultWriter::new();
        writer.expect_persist().times(1).returning(move |_| Ok(id));

        let garbage = "data: {\"type\":\"Teleported\"}\n\n";
        let handle = spawn(chunks(&[garbage, DONE]), pending(), Arc::new(writer), 4);

        assert_eq!(
            collect(handle.body).await,
            [garbage, DONE].concat().into_bytes()
        );
        assert_eq!(handle.outcome.await.unwrap(), RunOutcome::Persisted(id));
    }

    #[tokio::test]
    async fn test_persist_failure_still_relays() {
        let mut writer = MockResultWriter::new();
        writer
            .expect_persist()
            .times(1)
            .returning(|_| Err(PersistenceError::from(sqlx::Error::PoolTimedOut)));

        let handle = spawn(chunks(&[DONE]), pending(), Arc::new(writer), 4);

        assert_eq!(collect(handle.body).await, DONE.as_bytes());
        assert_eq!(handle.outcome.await.unwrap(), RunOutcome::PersistFailed);
    }

    #[tokio::test]
    async fn test_truncated_done_is_not_persisted() {
        let mut writer = MockResultWriter::new();
        writer.expect_persist().times(0);

        let cut = DONE.trim_end();
        let handle = spawn(chunks(&[cut]), pending(), Arc::new(writer), 4);

        collect(handle.body).await;
        assert_eq!(
            handle.outcome.await.unwrap(),
            RunOutcome::Incomplete(Interruption::EndOfStream)
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_ends_run() {
        let mut writer = MockResultWriter::new();
        writer.expect_persist().times(0);

        let upstream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"data: {\"type\":\"Compiling\"}\n\n")),
            Err("connection reset"),
        ]);
        let handle = spawn(upstream, pending(), Arc::new(writer), 4);

        collect(handle.body).await;
        assert_eq!(
            handle.outcome.await.unwrap(),
            RunOutcome::Incomplete(Interruption::UpstreamBroken("connection reset".to_string()))
        );
    }

    #[tokio::test]
    async fn test_caller_disconnect_stops_reading() {
        let mut writer = MockResultWriter::new();
        writer.expect_persist().times(0);

        // Upstream that never finishes after its first chunk
        let upstream = chunks(&["data: {\"type\":\"Compiling\"}\n\n"])
            .chain(futures::stream::pending());
        let handle = spawn(upstream, pending(), Arc::new(writer), 4);

        drop(handle.body);
        assert_eq!(
            handle.outcome.await.unwrap(),
            RunOutcome::Incomplete(Interruption::CallerGone)
        );
    }
}
