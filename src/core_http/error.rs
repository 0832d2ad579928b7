use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("route table full ({max} entries)")]
    RouteTableFull { max: usize },

    #[error("request larger than {capacity} bytes")]
    RequestTooLarge { capacity: usize },
}
