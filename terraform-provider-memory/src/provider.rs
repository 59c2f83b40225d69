//! The "memory" resource: a value cell persisted in the orchestrator's
//! state, written through the write-only `new_value` attribute and read back
//! through the computed `value` attribute.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use tfcty::Value;
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::grpc::tfplugin6::deferred::Reason;
use crate::grpc::tfplugin6::diagnostic::Severity;
use crate::grpc::tfplugin6::{
    apply_resource_change, configure_provider, get_functions, get_metadata, get_provider_schema,
    plan_resource_change, read_resource, schema, stop_provider, upgrade_resource_state,
    validate_provider_config, validate_resource_config, Deferred, Diagnostic, Schema,
    ServerCapabilities,
};
use crate::grpc::Provider;
use crate::marshal::{
    attr_path, diagnostics_for_err, memory_val_from_json, memory_val_from_proto,
    memory_val_to_proto,
};

/// The resource type name as declared to the orchestrator.
pub const RESOURCE_TYPE_NAME: &str = "memory";

/// Serves the provider operations for the memory resource type.
///
/// Every operation is a pure function of its request, except for the
/// deferral capability flag: negotiated once in ConfigureProvider, read by
/// later plans, never cleared for the lifetime of the process.
pub struct MemoryProvider {
    deferral_allowed: AtomicBool,
}

impl MemoryProvider {
    pub fn new() -> Self {
        MemoryProvider {
            deferral_allowed: AtomicBool::new(false),
        }
    }
}

#[tonic::async_trait]
impl Provider for MemoryProvider {
    async fn get_metadata(
        &self,
        _request: Request<get_metadata::Request>,
    ) -> Result<Response<get_metadata::Response>, Status> {
        Ok(Response::new(get_metadata::Response {
            server_capabilities: Some(ServerCapabilities::default()),
            diagnostics: vec![],
            resources: vec![get_metadata::ResourceMetadata {
                type_name: RESOURCE_TYPE_NAME.to_string(),
            }],
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<get_provider_schema::Request>,
    ) -> Result<Response<get_provider_schema::Response>, Status> {
        Ok(Response::new(get_provider_schema::Response {
            provider: Some(Schema {
                version: 0,
                block: Some(schema::Block::default()),
            }),
            resource_schemas: HashMap::from([(RESOURCE_TYPE_NAME.to_string(), memory_schema())]),
            diagnostics: vec![],
            server_capabilities: Some(ServerCapabilities::default()),
        }))
    }

    async fn validate_provider_config(
        &self,
        _request: Request<validate_provider_config::Request>,
    ) -> Result<Response<validate_provider_config::Response>, Status> {
        // There is nothing to constrain beyond the schema itself, which the
        // envelope decoding already enforces.
        Ok(Response::new(validate_provider_config::Response {
            diagnostics: vec![],
        }))
    }

    async fn validate_resource_config(
        &self,
        _request: Request<validate_resource_config::Request>,
    ) -> Result<Response<validate_resource_config::Response>, Status> {
        Ok(Response::new(validate_resource_config::Response {
            diagnostics: vec![],
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<upgrade_resource_state::Request>,
    ) -> Result<Response<upgrade_resource_state::Response>, Status> {
        let req = request.into_inner();
        // Persisted state only ever arrives in the structured-text form.
        let raw = req.raw_state.unwrap_or_default();
        let obj = match memory_val_from_json(&raw.json) {
            Ok(obj) => obj,
            Err(err) => {
                return Ok(Response::new(upgrade_resource_state::Response {
                    upgraded_state: None,
                    diagnostics: diagnostics_for_err(
                        "Failed to upgrade previous run state",
                        "Previous run state is invalid",
                        &err,
                    ),
                }));
            }
        };
        match memory_val_to_proto(&obj) {
            Ok(dv) => Ok(Response::new(upgrade_resource_state::Response {
                upgraded_state: Some(dv),
                diagnostics: vec![],
            })),
            Err(err) => Ok(Response::new(upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_for_err(
                    "Failed to reserialize previous run state",
                    "Previous run state is invalid",
                    &err,
                ),
            })),
        }
    }

    async fn configure_provider(
        &self,
        request: Request<configure_provider::Request>,
    ) -> Result<Response<configure_provider::Response>, Status> {
        let req = request.into_inner();
        let deferral_allowed = req
            .client_capabilities
            .map(|c| c.deferral_allowed)
            .unwrap_or(false);
        if deferral_allowed {
            // Set-once for the process lifetime; plans load with Acquire.
            self.deferral_allowed.store(true, Ordering::Release);
        }
        debug!(deferral_allowed, "provider configured");
        Ok(Response::new(configure_provider::Response {
            diagnostics: vec![],
        }))
    }

    async fn read_resource(
        &self,
        request: Request<read_resource::Request>,
    ) -> Result<Response<read_resource::Response>, Status> {
        // There is no external source of truth to detect drift against; the
        // stored state is the value.
        let req = request.into_inner();
        Ok(Response::new(read_resource::Response {
            new_state: req.current_state,
            ..Default::default()
        }))
    }

    async fn plan_resource_change(
        &self,
        request: Request<plan_resource_change::Request>,
    ) -> Result<Response<plan_resource_change::Response>, Status> {
        let req = request.into_inner();

        let config = match memory_val_from_proto(req.config.as_ref()) {
            Ok(config) => config,
            Err(err) => {
                return Ok(Response::new(plan_resource_change::Response {
                    diagnostics: diagnostics_for_err(
                        "Failed to decode configuration value",
                        "Configuration value is invalid",
                        &err,
                    ),
                    ..Default::default()
                }));
            }
        };
        let prior = match memory_val_from_proto(req.prior_state.as_ref()) {
            Ok(prior) => prior,
            Err(err) => {
                return Ok(Response::new(plan_resource_change::Response {
                    diagnostics: diagnostics_for_err(
                        "Failed to decode prior state value",
                        "Prior state value is invalid",
                        &err,
                    ),
                    ..Default::default()
                }));
            }
        };

        let new_value = config.attr("new_value").cloned().unwrap_or(Value::Null);

        if !new_value.is_known() {
            // The final value must never be guessed; either hand the plan
            // back for a later pass or report that we cannot proceed.
            if !self.deferral_allowed.load(Ordering::Acquire) {
                return Ok(Response::new(plan_resource_change::Response {
                    diagnostics: vec![Diagnostic {
                        severity: Severity::Error as i32,
                        summary: "New value not yet known".to_string(),
                        detail: "The new_value argument is derived from a result that will not \
                                 be known until the apply phase, so \"memory\" cannot determine \
                                 whether you intend to write to it.\n\nTo avoid this problem, \
                                 either allow deferral for this plan or exclude this resource \
                                 from the plan until the new value has been finalized."
                            .to_string(),
                        attribute: Some(attr_path("new_value")),
                    }],
                    ..Default::default()
                }));
            }
            return Ok(Response::new(plan_resource_change::Response {
                planned_state: req.proposed_new_state,
                deferred: Some(Deferred {
                    reason: Reason::ResourceConfigUnknown as i32,
                }),
                ..Default::default()
            }));
        }

        if prior.is_null() && new_value.is_null() {
            return Ok(Response::new(plan_resource_change::Response {
                diagnostics: vec![Diagnostic {
                    severity: Severity::Error as i32,
                    summary: "New value is required during creation".to_string(),
                    detail: "This memory object has not yet been created, so new_value must \
                             be set to initialize the memory."
                        .to_string(),
                    attribute: Some(attr_path("new_value")),
                }],
                ..Default::default()
            }));
        }

        if new_value.is_null() {
            // No new value given: preserve the prior state verbatim,
            // retaining the previously stored value.
            return Ok(Response::new(plan_resource_change::Response {
                planned_state: req.prior_state,
                ..Default::default()
            }));
        }

        // new_value is write-only and not guaranteed to hold the same value
        // again during the apply phase, so the planned stored value stays
        // unknown until then; the configuration is consulted again on apply.
        let planned = Value::Object(BTreeMap::from([
            ("new_value".to_string(), new_value.null_like()),
            ("value".to_string(), Value::Unknown),
        ]));
        match memory_val_to_proto(&planned) {
            Ok(dv) => Ok(Response::new(plan_resource_change::Response {
                planned_state: Some(dv),
                ..Default::default()
            })),
            Err(err) => Ok(Response::new(plan_resource_change::Response {
                diagnostics: diagnostics_for_err(
                    "Failed to serialize planned new state",
                    "Could not serialize the planned new state",
                    &err,
                ),
                ..Default::default()
            })),
        }
    }

    async fn apply_resource_change(
        &self,
        request: Request<apply_resource_change::Request>,
    ) -> Result<Response<apply_resource_change::Response>, Status> {
        let req = request.into_inner();

        let planned = match memory_val_from_proto(req.planned_state.as_ref()) {
            Ok(planned) => planned,
            Err(err) => {
                return Ok(Response::new(apply_resource_change::Response {
                    diagnostics: diagnostics_for_err(
                        "Failed to decode planned state value",
                        "Planned state value is invalid",
                        &err,
                    ),
                    ..Default::default()
                }));
            }
        };

        if planned.is_null() {
            // A null planned state destroys the object; there is nothing
            // external to release.
            return Ok(Response::new(apply_resource_change::Response {
                new_state: req.planned_state,
                ..Default::default()
            }));
        }

        let value_known = planned.attr("value").map(Value::is_known).unwrap_or(false);
        if value_known {
            // The stored value is not changing; the plan already carries
            // the final state.
            return Ok(Response::new(apply_resource_change::Response {
                new_state: req.planned_state,
                ..Default::default()
            }));
        }

        // The value was left unknown at plan time, so the final new_value
        // comes from the configuration.
        let config = match memory_val_from_proto(req.config.as_ref()) {
            Ok(config) => config,
            Err(err) => {
                return Ok(Response::new(apply_resource_change::Response {
                    diagnostics: diagnostics_for_err(
                        "Failed to decode configuration value",
                        "Configuration value is invalid",
                        &err,
                    ),
                    ..Default::default()
                }));
            }
        };
        let new_value = config.attr("new_value").cloned().unwrap_or(Value::Null);
        if new_value.is_null() {
            // A null new_value should have taken the known-value branch
            // above, but write-only attributes are loosely constrained, so
            // tolerate it and keep the prior state.
            return Ok(Response::new(apply_resource_change::Response {
                new_state: req.prior_state,
                ..Default::default()
            }));
        }

        let new_obj = Value::Object(BTreeMap::from([
            // Write-only attribute, always null in responses.
            ("new_value".to_string(), new_value.null_like()),
            ("value".to_string(), new_value),
        ]));
        match memory_val_to_proto(&new_obj) {
            Ok(dv) => Ok(Response::new(apply_resource_change::Response {
                new_state: Some(dv),
                ..Default::default()
            })),
            Err(err) => Ok(Response::new(apply_resource_change::Response {
                diagnostics: diagnostics_for_err(
                    "Failed to serialize final state",
                    "Could not serialize the updated state",
                    &err,
                ),
                ..Default::default()
            })),
        }
    }

    async fn get_functions(
        &self,
        _request: Request<get_functions::Request>,
    ) -> Result<Response<get_functions::Response>, Status> {
        Ok(Response::new(get_functions::Response {
            diagnostics: vec![],
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<stop_provider::Request>,
    ) -> Result<Response<stop_provider::Response>, Status> {
        Ok(Response::new(stop_provider::Response {
            error: String::new(),
        }))
    }
}

/// Schema of the memory resource: a write-only dynamic input and a computed
/// dynamic output.
fn memory_schema() -> Schema {
    Schema {
        version: 0,
        block: Some(schema::Block {
            version: 0,
            attributes: vec![
                schema::Attribute {
                    name: "new_value".to_string(),
                    r#type: b"\"dynamic\"".to_vec(),
                    optional: true,
                    write_only: true,
                    ..Default::default()
                },
                schema::Attribute {
                    name: "value".to_string(),
                    r#type: b"\"dynamic\"".to_vec(),
                    computed: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grpc::tfplugin6::{attribute_path::step::Selector, ClientCapabilities, DynamicValue, RawState};
    use tfcty::Type;

    fn provider() -> MemoryProvider {
        MemoryProvider::new()
    }

    fn dv(val: &Value) -> DynamicValue {
        memory_val_to_proto(val).unwrap()
    }

    fn null_dv() -> DynamicValue {
        dv(&Value::Null)
    }

    fn decode(dv: &DynamicValue) -> Value {
        memory_val_from_proto(Some(dv)).unwrap()
    }

    fn dynamic_string(s: &str) -> Value {
        Value::Dynamic {
            ty: Type::String,
            value: Box::new(Value::String(s.to_string())),
        }
    }

    fn config_obj(new_value: Value) -> Value {
        Value::Object(BTreeMap::from([
            ("new_value".to_string(), new_value),
            ("value".to_string(), Value::Null),
        ]))
    }

    fn stored_obj(value: Value) -> Value {
        Value::Object(BTreeMap::from([
            ("new_value".to_string(), Value::Null),
            ("value".to_string(), value),
        ]))
    }

    async fn configure_with_deferral(p: &MemoryProvider) {
        p.configure_provider(Request::new(configure_provider::Request {
            client_capabilities: Some(ClientCapabilities {
                deferral_allowed: true,
                ..Default::default()
            }),
            ..Default::default()
        }))
        .await
        .unwrap();
    }

    fn assert_single_error_on_new_value(diagnostics: &[Diagnostic], summary: &str) {
        assert_eq!(diagnostics.len(), 1);
        let diag = &diagnostics[0];
        assert_eq!(diag.severity, Severity::Error as i32);
        assert_eq!(diag.summary, summary);
        let steps = &diag.attribute.as_ref().unwrap().steps;
        assert_eq!(
            steps[0].selector,
            Some(Selector::AttributeName("new_value".to_string()))
        );
    }

    #[tokio::test]
    async fn test_plan_create_leaves_value_unknown() {
        let resp = provider()
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                config: Some(dv(&config_obj(dynamic_string("hello")))),
                prior_state: Some(null_dv()),
                proposed_new_state: Some(dv(&config_obj(dynamic_string("hello")))),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.diagnostics.is_empty(), "{:?}", resp.diagnostics);
        assert!(resp.deferred.is_none());
        let planned = decode(resp.planned_state.as_ref().unwrap());
        // The write-only input is masked, keeping its type.
        assert_eq!(
            planned.attr("new_value"),
            Some(&dynamic_string("hello").null_like())
        );
        // The stored value is not resolved until apply.
        assert_eq!(planned.attr("value"), Some(&Value::Unknown));
    }

    #[tokio::test]
    async fn test_apply_resolves_value_from_config() {
        let planned = Value::Object(BTreeMap::from([
            ("new_value".to_string(), dynamic_string("hello").null_like()),
            ("value".to_string(), Value::Unknown),
        ]));
        let resp = provider()
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                prior_state: Some(null_dv()),
                planned_state: Some(dv(&planned)),
                config: Some(dv(&config_obj(dynamic_string("hello")))),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.diagnostics.is_empty(), "{:?}", resp.diagnostics);
        let new_state = decode(resp.new_state.as_ref().unwrap());
        assert_eq!(new_state.attr("value"), Some(&dynamic_string("hello")));
        let masked = new_state.attr("new_value").unwrap();
        assert!(masked.is_null(), "write-only attribute must be masked");
    }

    #[tokio::test]
    async fn test_plan_null_new_value_preserves_prior_state() {
        let prior = dv(&stored_obj(dynamic_string("kept")));
        let resp = provider()
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                config: Some(dv(&config_obj(Value::Null))),
                prior_state: Some(prior.clone()),
                proposed_new_state: Some(prior.clone()),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.diagnostics.is_empty());
        assert_eq!(resp.planned_state, Some(prior));
    }

    #[tokio::test]
    async fn test_plan_requires_new_value_on_creation() {
        let resp = provider()
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                config: Some(dv(&config_obj(Value::Null))),
                prior_state: Some(null_dv()),
                proposed_new_state: Some(null_dv()),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.planned_state.is_none());
        assert_single_error_on_new_value(&resp.diagnostics, "New value is required during creation");
    }

    #[tokio::test]
    async fn test_plan_unknown_new_value_without_deferral_is_an_error() {
        let resp = provider()
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                config: Some(dv(&config_obj(Value::Unknown))),
                prior_state: Some(null_dv()),
                proposed_new_state: Some(dv(&config_obj(Value::Unknown))),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.planned_state.is_none());
        assert!(resp.deferred.is_none());
        assert_single_error_on_new_value(&resp.diagnostics, "New value not yet known");
    }

    #[tokio::test]
    async fn test_plan_unknown_new_value_defers_when_allowed() {
        let p = provider();
        configure_with_deferral(&p).await;

        let proposed = dv(&config_obj(Value::Unknown));
        let resp = p
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                config: Some(dv(&config_obj(Value::Unknown))),
                prior_state: Some(null_dv()),
                proposed_new_state: Some(proposed.clone()),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.diagnostics.is_empty());
        assert_eq!(resp.planned_state, Some(proposed));
        assert_eq!(
            resp.deferred,
            Some(Deferred {
                reason: Reason::ResourceConfigUnknown as i32,
            })
        );
    }

    #[tokio::test]
    async fn test_apply_known_value_echoes_planned_state() {
        let planned = dv(&stored_obj(dynamic_string("unchanged")));
        let resp = provider()
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                prior_state: Some(planned.clone()),
                planned_state: Some(planned.clone()),
                config: Some(dv(&config_obj(Value::Null))),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.diagnostics.is_empty());
        assert_eq!(resp.new_state, Some(planned));
    }

    #[tokio::test]
    async fn test_apply_null_planned_state_destroys() {
        let resp = provider()
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                prior_state: Some(dv(&stored_obj(dynamic_string("old")))),
                planned_state: Some(null_dv()),
                config: Some(null_dv()),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.diagnostics.is_empty());
        assert_eq!(resp.new_state, Some(null_dv()));
    }

    #[tokio::test]
    async fn test_apply_null_config_new_value_keeps_prior_state() {
        // Should not happen given the planning rules, but the provider
        // tolerates it by keeping the prior state.
        let planned = Value::Object(BTreeMap::from([
            ("new_value".to_string(), Value::Null),
            ("value".to_string(), Value::Unknown),
        ]));
        let prior = dv(&stored_obj(dynamic_string("prior")));
        let resp = provider()
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                prior_state: Some(prior.clone()),
                planned_state: Some(dv(&planned)),
                config: Some(dv(&config_obj(Value::Null))),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.diagnostics.is_empty());
        assert_eq!(resp.new_state, Some(prior));
    }

    #[tokio::test]
    async fn test_read_resource_is_identity() {
        let state = dv(&stored_obj(dynamic_string("anything")));
        let resp = provider()
            .read_resource(Request::new(read_resource::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                current_state: Some(state.clone()),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.diagnostics.is_empty());
        assert_eq!(resp.new_state, Some(state));
    }

    #[tokio::test]
    async fn test_upgrade_state_migrates_json_to_msgpack() {
        let legacy = serde_json::json!({
            "new_value": null,
            "value": {"value": 42, "type": "number"},
        });
        let resp = provider()
            .upgrade_resource_state(Request::new(upgrade_resource_state::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                version: 0,
                raw_state: Some(RawState {
                    json: legacy.to_string().into_bytes(),
                    ..Default::default()
                }),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.diagnostics.is_empty(), "{:?}", resp.diagnostics);
        let upgraded = resp.upgraded_state.unwrap();
        assert!(upgraded.json.is_empty(), "output must be binary");
        assert_eq!(
            decode(&upgraded),
            stored_obj(Value::Dynamic {
                ty: Type::Number,
                value: Box::new(Value::Number(serde_json::Number::from(42))),
            })
        );
    }

    #[tokio::test]
    async fn test_plan_decode_failure_is_a_diagnostic() {
        let resp = provider()
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                config: Some(DynamicValue {
                    msgpack: vec![0x81], // truncated map
                    json: Vec::new(),
                }),
                prior_state: Some(null_dv()),
                proposed_new_state: Some(null_dv()),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.planned_state.is_none());
        assert_eq!(resp.diagnostics.len(), 1);
        assert_eq!(
            resp.diagnostics[0].summary,
            "Failed to decode configuration value"
        );
    }

    #[tokio::test]
    async fn test_schema_declares_both_attributes() {
        let resp = provider()
            .get_provider_schema(Request::new(get_provider_schema::Request {}))
            .await
            .unwrap()
            .into_inner();

        let schema = &resp.resource_schemas[RESOURCE_TYPE_NAME];
        let attrs = &schema.block.as_ref().unwrap().attributes;
        let new_value = attrs.iter().find(|a| a.name == "new_value").unwrap();
        assert!(new_value.optional);
        assert!(new_value.write_only);
        assert_eq!(new_value.r#type, b"\"dynamic\"");
        let value = attrs.iter().find(|a| a.name == "value").unwrap();
        assert!(value.computed);
        assert_eq!(value.r#type, b"\"dynamic\"");
    }

    #[tokio::test]
    async fn test_static_operations() {
        let p = provider();
        let validate = p
            .validate_provider_config(Request::new(validate_provider_config::Request {
                config: Some(null_dv()),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(validate.diagnostics.is_empty());

        let validate = p
            .validate_resource_config(Request::new(validate_resource_config::Request {
                type_name: RESOURCE_TYPE_NAME.to_string(),
                config: Some(null_dv()),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(validate.diagnostics.is_empty());

        let metadata = p
            .get_metadata(Request::new(get_metadata::Request {}))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(metadata.resources.len(), 1);
        assert_eq!(metadata.resources[0].type_name, RESOURCE_TYPE_NAME);

        let functions = p
            .get_functions(Request::new(get_functions::Request {}))
            .await
            .unwrap()
            .into_inner();
        assert!(functions.diagnostics.is_empty());

        let stop = p
            .stop_provider(Request::new(stop_provider::Request {}))
            .await
            .unwrap()
            .into_inner();
        assert!(stop.error.is_empty());
    }
}
