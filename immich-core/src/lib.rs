mod client;

pub use client::{
    Album, AlbumDetail, Asset, BulkIdError, BulkIdResponse, ImmichClient, ImmichError, Library,
};
