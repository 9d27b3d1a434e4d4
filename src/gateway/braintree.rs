//! Braintree client over the GraphQL payments API.
//!
//! - Endpoint: per environment, see [`BraintreeEnvironment::graphql_url`]
//! - Authentication: HTTP Basic with `public_key:private_key`
//! - API version: sent in the `Braintree-Version` header

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::config::BraintreeConfig;
use crate::gateway::{GatewayError, PaymentGateway, SaleRequest};

const API_VERSION: &str = "2024-08-01";

const CREATE_CLIENT_TOKEN: &str = "mutation CreateClientToken { createClientToken { clientToken } }";

const TRANSACTION_FIELDS: &str = "transaction { id legacyId status createdAt \
    amount { value currencyCode } \
    paymentMethodSnapshot { __typename ... on CreditCardDetails { brandCode last4 } } }";

#[derive(Debug, Clone)]
pub struct BraintreeGateway {
    client: reqwest::Client,
    endpoint: String,
    merchant_id: String,
}

impl BraintreeGateway {
    /// # Errors
    ///
    /// Returns `Configuration` if the credentials cannot form a header and
    /// `Http` if the client fails to build.
    pub fn new(config: &BraintreeConfig) -> Result<Self, GatewayError> {
        Self::with_endpoint(config, config.environment.graphql_url())
    }

    /// Same as [`BraintreeGateway::new`] against an explicit endpoint.
    pub fn with_endpoint(config: &BraintreeConfig, endpoint: &str) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();

        let credentials = format!("{}:{}", config.public_key, config.private_key.expose_secret());
        let auth_value = format!("Basic {}", STANDARD.encode(credentials));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| GatewayError::Configuration(format!("Invalid Braintree credentials: {e}")))?,
        );
        headers.insert("Braintree-Version", HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!(
            "Braintree gateway ready for merchant {} ({})",
            config.merchant_id, config.environment
        );

        Ok(BraintreeGateway {
            client,
            endpoint: endpoint.to_string(),
            merchant_id: config.merchant_id.clone(),
        })
    }

    async fn execute(&self, query: &str, variables: Value) -> Result<Value, GatewayError> {
        let body = json!({ "query": query, "variables": variables });
        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status: status.as_u16(), message });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(format!("Failed to parse response: {e}")))?;
        extract_data(payload)
    }
}

/// Splits a GraphQL reply into its `data` object or the joined error messages.
fn extract_data(payload: Value) -> Result<Value, GatewayError> {
    if let Some(errors) = payload.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let message = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(GatewayError::Rejected(message));
        }
    }

    match payload.get("data") {
        Some(data) if !data.is_null() => Ok(data.clone()),
        _ => Err(GatewayError::Parse("response carries neither data nor errors".to_string())),
    }
}

/// Mutation name and GraphQL document for a sale.
fn sale_mutation(submit_for_settlement: bool) -> (&'static str, String) {
    let (name, input) = if submit_for_settlement {
        ("chargePaymentMethod", "ChargePaymentMethodInput")
    } else {
        ("authorizePaymentMethod", "AuthorizePaymentMethodInput")
    };
    let query = format!("mutation Sale($input: {input}!) {{ {name}(input: $input) {{ {TRANSACTION_FIELDS} }} }}");
    (name, query)
}

fn sale_variables(request: &SaleRequest) -> Value {
    json!({
        "input": {
            "paymentMethodId": request.payment_method_nonce,
            "transaction": { "amount": request.amount }
        }
    })
}

#[async_trait]
impl PaymentGateway for BraintreeGateway {
    #[instrument(skip(self), fields(merchant = %self.merchant_id))]
    async fn generate_client_token(&self) -> Result<String, GatewayError> {
        let data = self.execute(CREATE_CLIENT_TOKEN, json!({})).await?;

        data.pointer("/createClientToken/clientToken")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                error!("Client token missing from Braintree response");
                GatewayError::Parse("missing createClientToken.clientToken".to_string())
            })
    }

    #[instrument(skip(self, request), fields(merchant = %self.merchant_id, amount = %request.amount))]
    async fn sale(&self, request: SaleRequest) -> Result<Value, GatewayError> {
        let (name, query) = sale_mutation(request.submit_for_settlement);
        debug!("Submitting {} to Braintree", name);

        let mut data = self.execute(&query, sale_variables(&request)).await?;
        let result = data
            .get_mut(name)
            .map(Value::take)
            .filter(|v| v.get("transaction").is_some_and(|t| !t.is_null()))
            .ok_or_else(|| GatewayError::Parse(format!("missing {name}.transaction")))?;

        info!("Braintree sale completed");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BraintreeEnvironment;
    use secrecy::SecretString;

    fn config() -> BraintreeConfig {
        BraintreeConfig {
            environment: BraintreeEnvironment::Sandbox,
            merchant_id: "merchant".to_string(),
            public_key: "public".to_string(),
            private_key: SecretString::from("private".to_string()),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_new_uses_environment_endpoint() {
        let gateway = BraintreeGateway::new(&config()).unwrap();
        assert_eq!(gateway.endpoint, BraintreeEnvironment::Sandbox.graphql_url());
    }

    #[test]
    fn test_sale_mutation_follows_settlement_flag() {
        let (name, query) = sale_mutation(true);
        assert_eq!(name, "chargePaymentMethod");
        assert!(query.contains("ChargePaymentMethodInput!"));

        let (name, query) = sale_mutation(false);
        assert_eq!(name, "authorizePaymentMethod");
        assert!(query.contains("authorizePaymentMethod(input: $input)"));
    }

    #[test]
    fn test_sale_variables() {
        let request = SaleRequest {
            amount: "30.00".to_string(),
            payment_method_nonce: "fake-valid-nonce".to_string(),
            submit_for_settlement: true,
        };
        assert_eq!(
            sale_variables(&request),
            json!({"input": {"paymentMethodId": "fake-valid-nonce", "transaction": {"amount": "30.00"}}})
        );
    }

    #[test]
    fn test_extract_data_reports_graphql_errors() {
        let payload = json!({"errors": [{"message": "Unknown payment method"}, {"message": "Declined"}], "data": null});
        match extract_data(payload) {
            Err(GatewayError::Rejected(message)) => assert_eq!(message, "Unknown payment method; Declined"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_extract_data_returns_data() {
        let payload = json!({"data": {"createClientToken": {"clientToken": "abc"}}, "extensions": {}});
        assert_eq!(extract_data(payload).unwrap()["createClientToken"]["clientToken"], "abc");
        assert!(matches!(extract_data(json!({})), Err(GatewayError::Parse(_))));
    }
}
