use crate::consts::DEFAULT_AWS_REGION;

use aws_config::{meta::region::RegionProviderChain, BehaviorVersion};

/// IoT data endpoints are usually configured as a bare host name.
pub fn https_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

pub async fn iot_client(mqtt_endpoint: &str) -> aws_sdk_iotdataplane::Client {
    let region_provider = RegionProviderChain::default_provider().or_else(DEFAULT_AWS_REGION);
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await;
    let iot_config = aws_sdk_iotdataplane::config::Builder::from(&sdk_config)
        .endpoint_url(https_endpoint(mqtt_endpoint))
        .build();
    aws_sdk_iotdataplane::Client::from_conf(iot_config)
}
