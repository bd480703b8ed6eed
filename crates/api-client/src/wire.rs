//! Backend wire models and translation helpers.
//!
//! The backend speaks Portuguese field names (`id_categoria`,
//! `texto_pergunta`, ...). This module defines the strict wire shapes and
//! translates them into the engine's domain types; domain code never sees a
//! wire struct.
//!
//! Notes:
//! - reads may spell the single-choice kind `opcoes` while creates expect
//!   `multipla_escolha`; the wire enum accepts both and serialises the
//!   latter
//! - a stored answer populates exactly one value field; when more than one
//!   arrives, text wins over number, number over date, date over boolean

use crate::error::ApiError;
use chrono::NaiveDate;
use ficha_core::{
    AnswerKind, AnswerValue, Category, CategoryId, NewAnswer, Question, QuestionId,
    StoredAnswer, SubjectId, SubjectRecord,
};
use ficha_types::{Cpf, NonEmptyText};
use serde::{Deserialize, Serialize};

/// Answer-kind as the backend spells it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipoResposta {
    #[serde(rename = "texto")]
    Texto,
    #[serde(rename = "numero")]
    Numero,
    #[serde(rename = "multipla_escolha", alias = "opcoes")]
    MultiplaEscolha,
    #[serde(rename = "data")]
    Data,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "sexo")]
    Sexo,
}

impl From<TipoResposta> for AnswerKind {
    fn from(wire: TipoResposta) -> Self {
        match wire {
            TipoResposta::Texto => AnswerKind::Text,
            TipoResposta::Numero => AnswerKind::Number,
            TipoResposta::MultiplaEscolha => AnswerKind::Choice,
            TipoResposta::Data => AnswerKind::Date,
            TipoResposta::Boolean => AnswerKind::Boolean,
            TipoResposta::Sexo => AnswerKind::Sex,
        }
    }
}

impl From<AnswerKind> for TipoResposta {
    fn from(kind: AnswerKind) -> Self {
        match kind {
            AnswerKind::Text => TipoResposta::Texto,
            AnswerKind::Number => TipoResposta::Numero,
            AnswerKind::Choice => TipoResposta::MultiplaEscolha,
            AnswerKind::Date => TipoResposta::Data,
            AnswerKind::Boolean => TipoResposta::Boolean,
            AnswerKind::Sex => TipoResposta::Sexo,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CategoriaWire {
    pub id_categoria: CategoryId,
    pub nome_categoria: String,
    #[serde(default)]
    pub descricao: Option<String>,
    pub ordem_exibicao: i32,
    pub ativa: bool,
}

impl TryFrom<CategoriaWire> for Category {
    type Error = ApiError;

    fn try_from(wire: CategoriaWire) -> Result<Self, Self::Error> {
        let name = NonEmptyText::new(&wire.nome_categoria).map_err(|_| {
            ApiError::InvalidWire(format!("category {} has a blank name", wire.id_categoria))
        })?;
        Ok(Category {
            id: wire.id_categoria,
            name,
            description: wire.descricao.filter(|d| !d.trim().is_empty()),
            display_order: wire.ordem_exibicao,
            active: wire.ativa,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PerguntaWire {
    pub id_pergunta: QuestionId,
    pub id_categoria: CategoryId,
    pub texto_pergunta: String,
    pub tipo_resposta: TipoResposta,
    #[serde(default)]
    pub opcoes_resposta: Option<Vec<String>>,
    pub obrigatoria: bool,
    pub ordem_categoria: i32,
    pub ativa: bool,
}

impl TryFrom<PerguntaWire> for Question {
    type Error = ApiError;

    fn try_from(wire: PerguntaWire) -> Result<Self, Self::Error> {
        let prompt = NonEmptyText::new(&wire.texto_pergunta).map_err(|_| {
            ApiError::InvalidWire(format!("question {} has a blank prompt", wire.id_pergunta))
        })?;
        Ok(Question {
            id: wire.id_pergunta,
            category_id: wire.id_categoria,
            prompt,
            kind: wire.tipo_resposta.into(),
            choices: wire.opcoes_resposta.unwrap_or_default(),
            required: wire.obrigatoria,
            rank: wire.ordem_categoria,
            active: wire.ativa,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AssistidoWire {
    pub id_assistido: SubjectId,
    pub nome: String,
    pub cpf: String,
    pub data_nascimento: String,
    pub status_ativo: bool,
}

impl TryFrom<AssistidoWire> for SubjectRecord {
    type Error = ApiError;

    fn try_from(wire: AssistidoWire) -> Result<Self, Self::Error> {
        let name = NonEmptyText::new(&wire.nome).map_err(|_| {
            ApiError::InvalidWire(format!("subject {} has a blank name", wire.id_assistido))
        })?;
        let cpf = Cpf::new(&wire.cpf).map_err(|err| {
            ApiError::InvalidWire(format!("subject {}: {err}", wire.id_assistido))
        })?;
        // The backend may serialise the birth date as a full timestamp; only
        // the calendar date carries meaning here.
        let birth_date = wire
            .data_nascimento
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(|| {
                ApiError::InvalidWire(format!(
                    "subject {} has an unparseable birth date: {}",
                    wire.id_assistido, wire.data_nascimento
                ))
            })?;
        Ok(SubjectRecord {
            id: Some(wire.id_assistido),
            name,
            cpf,
            birth_date,
            active: wire.status_ativo,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RespostaWire {
    pub id_assistido: SubjectId,
    pub id_pergunta: QuestionId,
    #[serde(default)]
    pub resposta_texto: Option<String>,
    #[serde(default)]
    pub resposta_numero: Option<f64>,
    #[serde(default)]
    pub resposta_data: Option<String>,
    #[serde(default)]
    pub resposta_boolean: Option<bool>,
}

impl TryFrom<RespostaWire> for StoredAnswer {
    type Error = ApiError;

    fn try_from(wire: RespostaWire) -> Result<Self, Self::Error> {
        let value = if let Some(text) = wire.resposta_texto {
            AnswerValue::Text(text)
        } else if let Some(number) = wire.resposta_numero {
            AnswerValue::Number(number)
        } else if let Some(date) = wire.resposta_data {
            AnswerValue::Date(date)
        } else if let Some(flag) = wire.resposta_boolean {
            AnswerValue::Boolean(flag)
        } else {
            return Err(ApiError::InvalidWire(format!(
                "stored answer for question {} has no value field",
                wire.id_pergunta
            )));
        };
        Ok(StoredAnswer {
            subject: wire.id_assistido,
            question: wire.id_pergunta,
            value,
        })
    }
}

/// Body of `POST /respostas`: identifiers plus exactly one value field.
#[derive(Clone, Debug, Serialize)]
pub struct CreateRespostaDto {
    pub id_assistido: SubjectId,
    pub id_pergunta: QuestionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resposta_texto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resposta_numero: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resposta_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resposta_boolean: Option<bool>,
}

impl From<&NewAnswer> for CreateRespostaDto {
    fn from(answer: &NewAnswer) -> Self {
        let mut dto = CreateRespostaDto {
            id_assistido: answer.subject,
            id_pergunta: answer.question,
            resposta_texto: None,
            resposta_numero: None,
            resposta_data: None,
            resposta_boolean: None,
        };
        match &answer.value {
            AnswerValue::Text(v) => dto.resposta_texto = Some(v.clone()),
            AnswerValue::Number(v) => dto.resposta_numero = Some(*v),
            AnswerValue::Date(v) => dto.resposta_data = Some(v.clone()),
            AnswerValue::Boolean(v) => dto.resposta_boolean = Some(*v),
        }
        dto
    }
}

/// Body of `POST /perguntas` (admin create-question).
#[derive(Clone, Debug, Serialize)]
pub struct CreatePerguntaDto {
    pub texto_pergunta: String,
    pub id_categoria: CategoryId,
    pub tipo_resposta: TipoResposta,
    pub opcoes_resposta: Vec<String>,
    pub obrigatoria: bool,
    pub ordem_categoria: i32,
    pub ativa: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}
