pub mod application_dto;
