//! Data transfer objects for the REST API.

pub mod common_dto;
pub mod subnet_dto;

pub use common_dto::{PaginationMeta, PaginationParams};
pub use subnet_dto::{
    CreateSubnetRequest, CreateSubnetResponse, DcParams, MaskValue, ModifySubnetRequest,
    SubnetDetailResponse, SubnetListResponse,
};
