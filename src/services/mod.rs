//! 服务层模块

mod assist_service;
mod prompt_service;
mod response_parser;

pub use assist_service::AssistService;
