//! Run Deliberation use case
//!
//! Orchestrates the full three-stage pipeline: parallel independent
//! generation, anonymized peer ranking, and chairman synthesis. Progress
//! is published as an append-only [`DeliberationEvent`] sequence; the
//! returned [`DeliberationOutcome`] is the same information in its final
//! structured shape.
//!
//! Failure policy: an individual model failing at any stage degrades only
//! that model's contribution. The run as a whole aborts in exactly two
//! cases (every stage-1 call failed, or the chairman call failed), and
//! both are reported as a terminal `error` event. Caller-initiated
//! cancellation is a third, distinct terminal outcome.

use crate::ports::event_logger::{EventLogger, NoEventLogger};
use crate::ports::llm_gateway::LlmGateway;
use crate::use_cases::summarize_title::SummarizeTitleUseCase;
use council_domain::{
    AggregateRanking, ChairmanResult, DeliberationEvent, DeliberationOutcome, DomainError,
    LabelMap, Message, Model, OutcomeMetadata, PromptTemplate, Question, Stage, StageOneResult,
    StageTwoResult, StreamEvent, aggregate_rankings, parse_ranking,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur during deliberation
#[derive(Error, Debug)]
pub enum RunDeliberationError {
    #[error("No models configured")]
    NoModels,

    #[error("All models failed to respond")]
    AllModelsFailed,

    #[error("Chairman synthesis failed: {0}")]
    ChairmanFailed(String),

    #[error("Deliberation cancelled")]
    Cancelled,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RunDeliberationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Input for the RunDeliberation use case
#[derive(Debug, Clone)]
pub struct RunDeliberationInput {
    /// The question to deliberate on
    pub question: Question,
    /// Council membership for stage 1 (judges are drawn from the same set)
    pub models: Vec<Model>,
    /// Fixed synthesis model for stage 3
    pub chairman: Model,
    /// Opaque business context, injected verbatim into every prompt
    pub context: Option<String>,
    /// Department role; affects prompt wording only
    pub role: Option<String>,
    /// Whether to run the auxiliary title summarization side-task
    pub generate_title: bool,
}

impl RunDeliberationInput {
    pub fn new(question: impl Into<Question>, models: Vec<Model>, chairman: Model) -> Self {
        Self {
            question: question.into(),
            models,
            chairman,
            context: None,
            role: None,
            generate_title: false,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_title(mut self) -> Self {
        self.generate_title = true;
        self
    }
}

/// Outcome of one model invocation within a stage fan-out
enum ModelCallError {
    Cancelled,
    Failed(String),
}

/// Cloneable emitter shared by the orchestrator and its fan-out tasks.
///
/// Every event goes to the transcript logger first, then to the caller's
/// channel. A dropped receiver is tolerated: the run keeps going so the
/// transcript stays complete.
#[derive(Clone)]
struct EventSink {
    tx: mpsc::Sender<DeliberationEvent>,
    logger: Arc<dyn EventLogger>,
}

impl EventSink {
    async fn emit(&self, event: DeliberationEvent) {
        self.logger.log(&event);
        let _ = self.tx.send(event).await;
    }
}

/// Use case for running a full deliberation
pub struct RunDeliberationUseCase {
    gateway: Arc<dyn LlmGateway>,
    event_logger: Arc<dyn EventLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl RunDeliberationUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            event_logger: Arc::new(NoEventLogger),
            cancellation_token: None,
        }
    }

    /// Record the run's event sequence through the given transcript logger
    pub fn with_event_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.event_logger = logger;
        self
    }

    /// Set a cancellation token for cooperative interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the pipeline, publishing progress events into `events`.
    ///
    /// Emits exactly one run-terminal event (`complete`, `error`, or
    /// `cancelled`) as the final element of the sequence.
    pub async fn execute(
        &self,
        input: RunDeliberationInput,
        events: mpsc::Sender<DeliberationEvent>,
    ) -> Result<DeliberationOutcome, RunDeliberationError> {
        let sink = EventSink {
            tx: events,
            logger: Arc::clone(&self.event_logger),
        };

        let title_handle = input.generate_title.then(|| {
            let titles = SummarizeTitleUseCase::new(Arc::clone(&self.gateway));
            let chairman = input.chairman.clone();
            let question = input.question.content().to_string();
            tokio::spawn(async move { titles.execute(&chairman, &question).await })
        });

        match self.run_stages(&input, &sink).await {
            Ok(mut outcome) => {
                if let Some(handle) = title_handle {
                    match handle.await {
                        Ok(Ok(title)) => {
                            sink.emit(DeliberationEvent::TitleComplete {
                                title: title.clone(),
                            })
                            .await;
                            outcome.metadata.title = Some(title);
                        }
                        Ok(Err(e)) => warn!("Title summarization failed: {}", e),
                        Err(e) => warn!("Title task aborted: {}", e),
                    }
                }
                sink.emit(DeliberationEvent::Complete).await;
                Ok(outcome)
            }
            Err(err) => {
                if let Some(handle) = title_handle {
                    handle.abort();
                }
                let terminal = if err.is_cancelled() {
                    DeliberationEvent::Cancelled {
                        message: err.to_string(),
                    }
                } else {
                    DeliberationEvent::Error {
                        message: err.to_string(),
                    }
                };
                sink.emit(terminal).await;
                Err(err)
            }
        }
    }

    async fn run_stages(
        &self,
        input: &RunDeliberationInput,
        sink: &EventSink,
    ) -> Result<DeliberationOutcome, RunDeliberationError> {
        if input.models.is_empty() {
            return Err(RunDeliberationError::NoModels);
        }

        info!(
            "Starting deliberation with {} models, chairman {}",
            input.models.len(),
            input.chairman
        );

        self.check_cancelled()?;
        let stage1 = self.stage_generation(input, sink).await?;

        // Failed or empty answers are excluded from ranking: judges must
        // never be asked to evaluate a non-answer.
        let usable: Vec<StageOneResult> =
            stage1.iter().filter(|r| r.is_usable()).cloned().collect();
        if usable.is_empty() {
            return Err(RunDeliberationError::AllModelsFailed);
        }

        // The label bijection covers exactly the usable answers, fixed
        // here (stage-1 completion order) before any judge is invoked.
        let participants: Vec<Model> = usable.iter().map(|r| r.model.clone()).collect();
        let label_map = LabelMap::assign(&participants)?;

        self.check_cancelled()?;
        let (stage2, aggregate) = self.stage_ranking(input, &usable, &label_map, sink).await?;

        self.check_cancelled()?;
        let stage3 = self.stage_synthesis(input, &usable, &aggregate, sink).await?;

        Ok(DeliberationOutcome {
            question: input.question.content().to_string(),
            stage1,
            stage2,
            stage3,
            metadata: OutcomeMetadata {
                label_to_model: label_map.to_wire(),
                aggregate_rankings: aggregate,
                title: None,
            },
        })
    }

    /// Stage 1: every council model answers in parallel.
    ///
    /// Hard barrier: returns only once all participants are terminal, and
    /// always with one result per configured model.
    async fn stage_generation(
        &self,
        input: &RunDeliberationInput,
        sink: &EventSink,
    ) -> Result<Vec<StageOneResult>, RunDeliberationError> {
        info!("Stage 1: independent answers");
        sink.emit(DeliberationEvent::Stage1Start).await;

        let system = PromptTemplate::stage1_system(input.role.as_deref(), input.context.as_deref());
        let user = PromptTemplate::stage1_query(input.question.content());

        let mut join_set = JoinSet::new();
        for model in &input.models {
            let gateway = Arc::clone(&self.gateway);
            let model = model.clone();
            let messages = vec![Message::system(&system), Message::user(&user)];
            let sink = sink.clone();
            let token = self.cancellation_token.clone();

            join_set.spawn(async move {
                let call =
                    stream_model_call(gateway, &model, messages, Stage::Generation, &sink, token)
                        .await;
                (model, call)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            let (model, call) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("Task join error: {}", e);
                    continue;
                }
            };

            match call {
                Ok(text) => {
                    info!("Model {} answered", model);
                    let result = StageOneResult::success(model.clone(), text);
                    sink.emit(DeliberationEvent::Stage1ModelComplete {
                        model,
                        response: result.clone(),
                    })
                    .await;
                    results.push(result);
                }
                Err(ModelCallError::Failed(cause)) => {
                    warn!("Model {} failed: {}", model, cause);
                    let result = StageOneResult::failure(model.clone(), cause.clone());
                    sink.emit(DeliberationEvent::Stage1ModelError {
                        model,
                        error: cause,
                    })
                    .await;
                    results.push(result);
                }
                Err(ModelCallError::Cancelled) => {
                    join_set.abort_all();
                    return Err(RunDeliberationError::Cancelled);
                }
            }
        }

        // No stage transition once cancelled, even with all results in
        self.check_cancelled()?;
        sink.emit(DeliberationEvent::Stage1Complete {
            results: results.clone(),
        })
        .await;
        Ok(results)
    }

    /// Stage 2: judges rank the anonymized answers in parallel.
    ///
    /// Judges are the participants whose stage-1 call produced a usable
    /// answer; there is no self-review suppression, so every judge ranks
    /// the full labeled set including its own entry.
    async fn stage_ranking(
        &self,
        input: &RunDeliberationInput,
        usable: &[StageOneResult],
        label_map: &LabelMap,
        sink: &EventSink,
    ) -> Result<(Vec<StageTwoResult>, Vec<AggregateRanking>), RunDeliberationError> {
        info!("Stage 2: peer ranking by {} judges", usable.len());
        sink.emit(DeliberationEvent::Stage2Start).await;

        let labeled: Vec<(String, String)> = label_map
            .entries()
            .map(|(label, model)| {
                let answer = usable
                    .iter()
                    .find(|r| &r.model == model)
                    .map(|r| r.content.clone())
                    .unwrap_or_default();
                (label.to_string(), answer)
            })
            .collect();

        let system = PromptTemplate::stage2_system(input.role.as_deref(), input.context.as_deref());
        let user = PromptTemplate::stage2_ranking(input.question.content(), &labeled);

        let mut join_set = JoinSet::new();
        for judge in usable {
            let gateway = Arc::clone(&self.gateway);
            let model = judge.model.clone();
            let messages = vec![Message::system(&system), Message::user(&user)];
            let sink = sink.clone();
            let token = self.cancellation_token.clone();

            join_set.spawn(async move {
                let call =
                    stream_model_call(gateway, &model, messages, Stage::Ranking, &sink, token)
                        .await;
                (model, call)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            let (model, call) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("Task join error: {}", e);
                    continue;
                }
            };

            match call {
                Ok(text) => {
                    let parsed = parse_ranking(&text, label_map);
                    if parsed.is_empty() {
                        debug!("Judge {} produced no parseable ranking", model);
                    }
                    let result = StageTwoResult::success(model.clone(), text, parsed);
                    sink.emit(DeliberationEvent::Stage2ModelComplete {
                        model,
                        response: result.clone(),
                    })
                    .await;
                    results.push(result);
                }
                Err(ModelCallError::Failed(cause)) => {
                    warn!("Judge {} failed: {}", model, cause);
                    let result = StageTwoResult::failure(model.clone(), cause.clone());
                    sink.emit(DeliberationEvent::Stage2ModelError {
                        model,
                        error: cause,
                    })
                    .await;
                    results.push(result);
                }
                Err(ModelCallError::Cancelled) => {
                    join_set.abort_all();
                    return Err(RunDeliberationError::Cancelled);
                }
            }
        }

        self.check_cancelled()?;
        let aggregate = aggregate_rankings(&results, label_map);
        sink.emit(DeliberationEvent::Stage2Complete {
            results: results.clone(),
            label_to_model: label_map.to_wire(),
            aggregate_rankings: aggregate.clone(),
        })
        .await;
        Ok((results, aggregate))
    }

    /// Stage 3: single chairman call, no internal concurrency.
    ///
    /// The chairman is trusted and sees de-anonymized answers plus the
    /// aggregate ranking. Its failure ends the run; there is no fallback.
    async fn stage_synthesis(
        &self,
        input: &RunDeliberationInput,
        usable: &[StageOneResult],
        aggregate: &[AggregateRanking],
        sink: &EventSink,
    ) -> Result<ChairmanResult, RunDeliberationError> {
        info!("Stage 3: synthesis by {}", input.chairman);
        sink.emit(DeliberationEvent::Stage3Start {
            model: input.chairman.clone(),
        })
        .await;

        let system = PromptTemplate::stage3_system(input.role.as_deref(), input.context.as_deref());
        let user = PromptTemplate::stage3_synthesis(input.question.content(), usable, aggregate);
        let messages = vec![Message::system(&system), Message::user(&user)];

        let call = stream_model_call(
            Arc::clone(&self.gateway),
            &input.chairman,
            messages,
            Stage::Synthesis,
            sink,
            self.cancellation_token.clone(),
        )
        .await;

        match call {
            Ok(text) => {
                let result = ChairmanResult::new(input.chairman.clone(), text);
                sink.emit(DeliberationEvent::Stage3Complete {
                    result: result.clone(),
                })
                .await;
                Ok(result)
            }
            Err(ModelCallError::Cancelled) => Err(RunDeliberationError::Cancelled),
            Err(ModelCallError::Failed(cause)) => {
                warn!("Chairman {} failed: {}", input.chairman, cause);
                sink.emit(DeliberationEvent::Stage3Error {
                    error: cause.clone(),
                })
                .await;
                Err(RunDeliberationError::ChairmanFailed(cause))
            }
        }
    }

    fn check_cancelled(&self) -> Result<(), RunDeliberationError> {
        if let Some(token) = &self.cancellation_token
            && token.is_cancelled()
        {
            return Err(RunDeliberationError::Cancelled);
        }
        Ok(())
    }
}

/// Drive one streamed model invocation, forwarding chunks as stage
/// token events.
///
/// Cancellation is observed at every suspension point; returning drops
/// the stream handle, which aborts the in-flight request, and nothing is
/// emitted afterwards.
async fn stream_model_call(
    gateway: Arc<dyn LlmGateway>,
    model: &Model,
    messages: Vec<Message>,
    stage: Stage,
    sink: &EventSink,
    token: Option<CancellationToken>,
) -> Result<String, ModelCallError> {
    if let Some(token) = &token
        && token.is_cancelled()
    {
        return Err(ModelCallError::Cancelled);
    }

    let opened = if let Some(token) = &token {
        tokio::select! {
            biased;
            _ = token.cancelled() => return Err(ModelCallError::Cancelled),
            opened = gateway.complete_streaming(model, &messages) => opened,
        }
    } else {
        gateway.complete_streaming(model, &messages).await
    };
    let mut handle = match opened {
        Ok(handle) => handle,
        Err(e) => return Err(ModelCallError::Failed(e.to_string())),
    };

    let mut full = String::new();
    loop {
        let event = if let Some(token) = &token {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(ModelCallError::Cancelled),
                event = handle.receiver.recv() => event,
            }
        } else {
            handle.receiver.recv().await
        };

        match event {
            Some(StreamEvent::Delta(chunk)) => {
                full.push_str(&chunk);
                sink.emit(token_event(stage, model, chunk)).await;
            }
            Some(StreamEvent::Completed(text)) => {
                return Ok(if full.is_empty() { text } else { full });
            }
            Some(StreamEvent::Error(cause)) => return Err(ModelCallError::Failed(cause)),
            // Channel closed without a terminal marker
            None => return Ok(full),
        }
    }
}

fn token_event(stage: Stage, model: &Model, content: String) -> DeliberationEvent {
    match stage {
        Stage::Generation => DeliberationEvent::Stage1Token {
            model: model.clone(),
            content,
        },
        Stage::Ranking => DeliberationEvent::Stage2Token {
            model: model.clone(),
            content,
        },
        Stage::Synthesis => DeliberationEvent::Stage3Token {
            model: model.clone(),
            content,
        },
    }
}
