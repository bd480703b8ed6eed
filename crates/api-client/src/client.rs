//! Bearer-token REST client for the record backend.

use crate::error::{ApiError, ApiResult};
use crate::wire::{
    AssistidoWire, CategoriaWire, CreatePerguntaDto, CreateRespostaDto, LoginRequest,
    LoginResponse, PerguntaWire, RespostaWire,
};
use async_trait::async_trait;
use ficha_core::{
    AnswerKind, BackendError, Category, CategoryId, ClientConfig, NewAnswer, Question,
    QuestionId, RecordBackend, SessionToken, StoredAnswer, SubjectId, SubjectRecord,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Parameters for the admin create-question operation.
#[derive(Clone, Debug)]
pub struct NewQuestion {
    pub category: CategoryId,
    pub prompt: String,
    pub kind: AnswerKind,
    pub choices: Vec<String>,
    pub required: bool,
    pub rank: i32,
}

/// HTTP client bound to one backend and one session's credentials.
///
/// The config is the whole request context: base URL and token are fixed at
/// construction, and every outgoing request attaches the same bearer token.
/// Obtaining a token (login) produces a new client rather than mutating an
/// existing one.
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl RestClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    fn authorised(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.token() {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    async fn check(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.authorised(self.http.get(self.url(path))).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Exchanges credentials for a session token.
    ///
    /// Sent without a bearer header; the caller builds a fresh client with
    /// the returned token attached to its config.
    pub async fn login(&self, email: &str, senha: &str) -> ApiResult<SessionToken> {
        let body = LoginRequest {
            email: email.to_owned(),
            senha: senha.to_owned(),
        };
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await?;
        let payload: LoginResponse = Self::check(response).await?.json().await?;
        SessionToken::new(payload.access_token)
            .map_err(|_| ApiError::InvalidWire("login returned an empty token".into()))
    }

    /// All subject records, for the list/search screens.
    pub async fn list_subjects(&self) -> ApiResult<Vec<SubjectRecord>> {
        let wires: Vec<AssistidoWire> = self.get_json("/assistidos").await?;
        wires.into_iter().map(SubjectRecord::try_from).collect()
    }

    /// Admin create-question.
    pub async fn create_question(&self, question: &NewQuestion) -> ApiResult<()> {
        let dto = CreatePerguntaDto {
            texto_pergunta: question.prompt.clone(),
            id_categoria: question.category,
            tipo_resposta: question.kind.into(),
            opcoes_resposta: question.choices.clone(),
            obrigatoria: question.required,
            ordem_categoria: question.rank,
            ativa: true,
        };
        let response = self
            .authorised(self.http.post(self.url("/perguntas")).json(&dto))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Admin delete-question.
    pub async fn delete_question(&self, question: QuestionId) -> ApiResult<()> {
        let response = self
            .authorised(self.http.delete(self.url(&format!("/perguntas/{question}"))))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordBackend for RestClient {
    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError> {
        let wires: Vec<CategoriaWire> = self.get_json("/categorias").await?;
        let categories: Result<Vec<Category>, ApiError> =
            wires.into_iter().map(Category::try_from).collect();
        Ok(categories?)
    }

    async fn fetch_questions(
        &self,
        category: CategoryId,
    ) -> Result<Vec<Question>, BackendError> {
        let wires: Vec<PerguntaWire> = self
            .get_json(&format!("/perguntas/categoria/{category}"))
            .await?;
        let questions: Result<Vec<Question>, ApiError> =
            wires.into_iter().map(Question::try_from).collect();
        Ok(questions?)
    }

    async fn fetch_subject(&self, subject: SubjectId) -> Result<SubjectRecord, BackendError> {
        let wire: AssistidoWire = self.get_json(&format!("/assistidos/{subject}")).await?;
        Ok(SubjectRecord::try_from(wire)?)
    }

    async fn fetch_answers(
        &self,
        subject: SubjectId,
    ) -> Result<Vec<StoredAnswer>, BackendError> {
        let wires: Vec<RespostaWire> = self
            .get_json(&format!("/respostas/assistido/{subject}"))
            .await?;
        let answers: Result<Vec<StoredAnswer>, ApiError> =
            wires.into_iter().map(StoredAnswer::try_from).collect();
        Ok(answers?)
    }

    async fn submit_answer(&self, answer: &NewAnswer) -> Result<(), BackendError> {
        let dto = CreateRespostaDto::from(answer);
        tracing::debug!(question = %answer.question, "submitting answer");
        let response = self
            .authorised(self.http.post(self.url("/respostas")).json(&dto))
            .send()
            .await
            .map_err(ApiError::from)?;
        Self::check(response).await?;
        Ok(())
    }
}
