use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use foundry_core::aws::{AuthorizerKind, ContentRoute};
use foundry_core::{CollectingDiagnostics, Diagnostics, SpecEditor, Value};
use foundry_gateway::origin::Bucket;
use foundry_gateway::provision::GatewayEndpoint;
use foundry_gateway::{
    Authorizer, BuildError, ContentEntry, Deferred, Function, Integration, PendingBuild, ProvisionError,
    ProvisionedApi, Provisioner, RestApiArgs, RestApiRequest, build,
};
use tokio::sync::oneshot;

const GREETING: &str = include_str!("fixtures/greeting.yaml");

#[derive(Default)]
struct RecordingProvisioner {
    requests: Mutex<Vec<RestApiRequest>>,
}

impl RecordingProvisioner {
    fn requests(&self) -> Vec<RestApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provisioner for RecordingProvisioner {
    async fn create_rest_api(&self, request: RestApiRequest) -> Result<ProvisionedApi, ProvisionError> {
        self.requests.lock().unwrap().push(request);
        Ok(ProvisionedApi {
            id: "abc123".to_string(),
            execution_arn: "arn:aws:execute-api:us-east-1:000000000000:abc123".to_string(),
        })
    }
}

struct FailingProvisioner;

#[async_trait]
impl Provisioner for FailingProvisioner {
    async fn create_rest_api(&self, _request: RestApiRequest) -> Result<ProvisionedApi, ProvisionError> {
        Err(ProvisionError("quota exceeded".to_string()))
    }
}

fn function(name: &str) -> Arc<Function> {
    Arc::new(Function::resolved(
        name,
        &format!("arn:invoke:{name}"),
        &format!("greeting-dev-{name}"),
    ))
}

fn diagnostics() -> Arc<dyn Diagnostics> {
    Arc::new(CollectingDiagnostics::new())
}

fn greeting_args() -> RestApiArgs {
    let mut args = RestApiArgs::new(
        "greeting",
        GREETING,
        Deferred::resolved("gateway role", "arn:aws:iam::000000000000:role/gw"),
    );
    args.integrations = vec![
        Integration::new("/greet", "get", function("greet")),
        Integration::new("/token", "post", function("token")),
    ];
    args.authorizers = vec![Authorizer::token("auth", function("validator"))];
    args.content = vec![ContentRoute::new("/index.html", "greeting-site").into()];
    args
}

fn str_at<'a>(editor: &'a SpecEditor, keys: &[&str]) -> Option<&'a str> {
    editor.get(keys).and_then(Value::as_str)
}

#[tokio::test]
async fn build_patches_and_provisions_once() {
    let provisioner = RecordingProvisioner::default();
    let built = build(greeting_args(), &provisioner, diagnostics())
        .await
        .unwrap();

    assert_eq!(built.id, "abc123");
    assert_eq!(
        built.host(&GatewayEndpoint::Aws {
            region: "us-east-1".to_string()
        }),
        "abc123.execute-api.us-east-1.amazonaws.com/greeting"
    );

    let requests = provisioner.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].name, "greeting");
    assert_eq!(requests[0].body, built.body);
    assert!(requests[0].stage.access_log_format.is_none());

    let rendered = SpecEditor::new(built.body.clone()).unwrap();
    assert_eq!(
        str_at(&rendered, &["paths", "/greet", "get", "x-function-name"]),
        Some("greeting-dev-greet")
    );
    assert_eq!(
        str_at(
            &rendered,
            &["paths", "/token", "post", "x-amazon-apigateway-integration", "uri"]
        ),
        Some("arn:invoke:token")
    );
    assert_eq!(
        str_at(
            &rendered,
            &["components", "securitySchemes", "auth", "x-amazon-apigateway-authorizer", "authorizerUri"]
        ),
        Some("arn:invoke:validator")
    );
    assert_eq!(
        str_at(
            &rendered,
            &["paths", "/index.html", "get", "x-amazon-apigateway-integration", "credentials"]
        ),
        Some("arn:aws:iam::000000000000:role/gw")
    );
    assert_eq!(
        rendered.get_function_names(),
        vec!["greeting-dev-greet", "greeting-dev-token", "greeting-dev-validator"]
    );
}

#[tokio::test]
async fn permissions_cover_each_function_once() {
    let mut args = greeting_args();
    let shared = function("greet");
    args.integrations = vec![
        Integration::new("/greet", "get", shared.clone()),
        Integration::new("/token", "post", shared),
    ];
    let built = build(args, &RecordingProvisioner::default(), diagnostics())
        .await
        .unwrap();

    assert_eq!(
        built.function_names,
        vec!["greeting-dev-greet", "greeting-dev-greet", "greeting-dev-validator"]
    );
    let names: Vec<&str> = built
        .permissions
        .iter()
        .map(|p| p.function_name.as_str())
        .collect();
    assert_eq!(names, vec!["greeting-dev-greet", "greeting-dev-validator"]);
    assert_eq!(
        built.permissions[0].source_arn,
        "arn:aws:execute-api:us-east-1:000000000000:abc123/*/*"
    );
}

#[tokio::test]
async fn out_of_order_resolution_keeps_declarations_paired() {
    let (greet_tx, greet_rx) = oneshot::channel::<String>();
    let (token_tx, token_rx) = oneshot::channel::<String>();
    let greet = Arc::new(Function::new(
        "greet",
        Deferred::from_future("greet invoke ARN", async move {
            greet_rx.await.map_err(|e| e.to_string())
        }),
        Deferred::resolved("greet name", "greet-fn"),
    ));
    let token = Arc::new(Function::new(
        "token",
        Deferred::from_future("token invoke ARN", async move {
            token_rx.await.map_err(|e| e.to_string())
        }),
        Deferred::resolved("token name", "token-fn"),
    ));

    let mut args = RestApiArgs::new("greeting", GREETING, Deferred::resolved("role", "arn:role"));
    args.integrations = vec![
        Integration::new("/greet", "get", greet),
        Integration::new("/token", "post", token),
    ];

    let pending = PendingBuild::new(args, diagnostics()).unwrap();
    let resolving = tokio::spawn(pending.resolve());

    // The later declaration resolves first.
    token_tx.send("arn:token".to_string()).unwrap();
    tokio::task::yield_now().await;
    assert!(!resolving.is_finished());
    greet_tx.send("arn:greet".to_string()).unwrap();

    let resolved = resolving.await.unwrap().unwrap();
    let pairs: Vec<(&str, &str)> = resolved
        .integrations()
        .iter()
        .map(|i| (i.target.path.as_str(), i.invoke_arn.as_str()))
        .collect();
    assert_eq!(pairs, vec![("/greet", "arn:greet"), ("/token", "arn:token")]);

    let body = resolved.render().unwrap();
    let rendered = SpecEditor::new(body).unwrap();
    assert_eq!(
        str_at(
            &rendered,
            &["paths", "/greet", "get", "x-amazon-apigateway-integration", "uri"]
        ),
        Some("arn:greet")
    );
}

#[tokio::test]
async fn one_failed_identifier_fails_the_build() {
    let mut args = greeting_args();
    args.authorizers = vec![Authorizer::token(
        "auth",
        Arc::new(Function::new(
            "validator",
            Deferred::failed("validator invoke ARN", "function creation failed"),
            Deferred::resolved("validator name", "validator-fn"),
        )),
    )];

    let provisioner = RecordingProvisioner::default();
    let err = build(args, &provisioner, diagnostics()).await.unwrap_err();
    match err {
        BuildError::ResolutionFailed(failure) => {
            assert_eq!(failure.label, "validator invoke ARN");
        }
        other => panic!("expected resolution failure, got {other:?}"),
    }
    assert!(provisioner.requests().is_empty());
}

#[tokio::test]
async fn failed_gateway_role_fails_the_build() {
    let mut args = greeting_args();
    args.gateway_role_arn = Deferred::failed("gateway role", "role not created");
    let err = build(args, &RecordingProvisioner::default(), diagnostics())
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::ResolutionFailed(_)));
}

#[tokio::test]
async fn failed_content_bucket_fails_the_build() {
    let mut args = greeting_args();
    args.content = vec![ContentEntry::new(
        "/index.html",
        Deferred::failed("site bucket id", "bucket not created"),
    )];
    let provisioner = RecordingProvisioner::default();
    let err = build(args, &provisioner, diagnostics()).await.unwrap_err();
    match err {
        BuildError::ResolutionFailed(failure) => assert_eq!(failure.label, "site bucket id"),
        other => panic!("expected resolution failure, got {other:?}"),
    }
    assert!(provisioner.requests().is_empty());
}

#[tokio::test]
async fn content_waits_for_bucket_created_alongside() {
    let (bucket_tx, bucket_rx) = oneshot::channel::<String>();
    let bucket = Bucket::new(
        Deferred::resolved("site bucket arn", "arn:aws:s3:::site-abc"),
        Deferred::from_future("site bucket id", async move {
            bucket_rx.await.map_err(|e| e.to_string())
        }),
        Deferred::resolved("site bucket domain", "site-abc.s3.us-east-1.amazonaws.com"),
    );
    let mut args = RestApiArgs::new("greeting", GREETING, Deferred::resolved("role", "arn:role"));
    args.content = vec![ContentEntry::backed_by("/index.html", &bucket)];

    let pending = PendingBuild::new(args, diagnostics()).unwrap();
    let resolving = tokio::spawn(pending.resolve());
    tokio::task::yield_now().await;
    assert!(!resolving.is_finished());
    bucket_tx.send("site-abc".to_string()).unwrap();

    let body = resolving.await.unwrap().unwrap().render().unwrap();
    let rendered = SpecEditor::new(body).unwrap();
    assert_eq!(
        str_at(
            &rendered,
            &["paths", "/index.html", "get", "x-amazon-apigateway-integration", "uri"]
        ),
        Some("arn:aws:apigateway:us-east-1:s3:path/site-abc/index.html")
    );
}

#[tokio::test]
async fn request_authorizer_is_rejected_before_provisioning() {
    let mut args = greeting_args();
    args.authorizers = vec![Authorizer::new(
        "auth",
        AuthorizerKind::Request,
        function("validator"),
    )];
    let provisioner = RecordingProvisioner::default();
    let err = build(args, &provisioner, diagnostics()).await.unwrap_err();
    assert!(matches!(err, BuildError::Patch(_)));
    assert!(provisioner.requests().is_empty());
}

#[tokio::test]
async fn unknown_operation_fails_the_build() {
    let mut args = greeting_args();
    args.integrations
        .push(Integration::new("/missing", "get", function("ghost")));
    let err = build(args, &RecordingProvisioner::default(), diagnostics())
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Patch(_)));
}

#[tokio::test]
async fn malformed_spec_fails_before_waiting() {
    let args = RestApiArgs::new(
        "broken",
        "paths: [unclosed\n",
        Deferred::resolved("role", "arn:role"),
    );
    let err = PendingBuild::new(args, diagnostics()).err().unwrap();
    assert!(matches!(err, BuildError::Spec(_)));
}

#[tokio::test]
async fn provisioning_failure_is_reported() {
    let err = build(greeting_args(), &FailingProvisioner, diagnostics())
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Provision(ProvisionError(ref m)) if m == "quota exceeded"));
}

#[tokio::test]
async fn strip_pattern_and_logging_are_applied() {
    let mut args = greeting_args();
    args.strip_pattern = Some("x-function-name".to_string());
    args.logging = true;

    let provisioner = RecordingProvisioner::default();
    let built = build(args, &provisioner, diagnostics()).await.unwrap();

    let rendered = SpecEditor::new(built.body.clone()).unwrap();
    assert!(rendered.get_function_names().is_empty());
    assert!(
        rendered
            .get(&["paths", "/greet", "get", "x-amazon-apigateway-integration"])
            .is_some()
    );
    // Permissions come from resolved names, not from the stripped document.
    assert_eq!(built.permissions.len(), 3);

    let request = &provisioner.requests()[0];
    let format = request.stage.access_log_format.as_ref().unwrap();
    assert_eq!(format["requestId"], "$context.requestId");
}

#[tokio::test]
async fn state_transitions_are_reported() {
    let sink = Arc::new(CollectingDiagnostics::new());
    build(greeting_args(), &RecordingProvisioner::default(), sink.clone())
        .await
        .unwrap();
    let messages = sink.messages();
    let position = |needle: &str| messages.iter().position(|m| m.contains(needle)).unwrap();
    assert!(position("pending") < position("all identifiers resolved"));
    assert!(position("all identifiers resolved") < position("built as abc123"));
}
