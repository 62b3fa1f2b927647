pub mod conferences;
