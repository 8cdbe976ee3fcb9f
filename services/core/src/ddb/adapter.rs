use aws_sdk_dynamodb::Client as RawClient;

/// DynamoDB client handle implementing the narrow operation traits of this module
/// (`GetItem`, `PutItem`, `Query`, `UpdateItem`, `DeleteItem`). Repositories depend on the
/// traits rather than on this type, so they can be exercised against in-memory doubles.
#[derive(Debug, Clone)]
pub struct Adapter {
    pub(crate) raw: RawClient,
}

impl Adapter {
    pub fn from_conf(conf: aws_sdk_dynamodb::Config) -> Self {
        RawClient::from_conf(conf).into()
    }
}

impl From<RawClient> for Adapter {
    fn from(raw: RawClient) -> Self {
        Adapter { raw }
    }
}
