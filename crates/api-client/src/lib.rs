//! REST adapter for the record backend.
//!
//! Implements `ficha_core::RecordBackend` over HTTP: strict wire models with
//! the backend's Portuguese field names, translation into domain types, and
//! bearer-token credential attachment sourced from the session's
//! `ClientConfig`.

mod client;
mod error;
mod wire;

pub use client::{NewQuestion, RestClient};
pub use error::{ApiError, ApiResult};
pub use wire::{
    AssistidoWire, CategoriaWire, CreatePerguntaDto, CreateRespostaDto, LoginRequest,
    LoginResponse, PerguntaWire, RespostaWire, TipoResposta,
};
