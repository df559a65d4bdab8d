pub mod face_card;
pub mod feed_view;
pub mod primary_button;
