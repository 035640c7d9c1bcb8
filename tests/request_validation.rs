use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use swagger_contract::{
    check_method_allowed, IncomingRequest, OperationDescriptor, RequestValidator, SpecDocument,
    SpecValidator, Version,
};

fn yaml(fixture: &str) -> Value {
    serde_yaml::from_str(fixture).unwrap()
}

fn petstore() -> SpecDocument {
    SpecDocument::v2(yaml(
        r##"
swagger: "2.0"
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets:
    post:
      consumes:
        - application/x-www-form-urlencoded
      parameters:
        - name: body
          in: body
          required: true
          schema:
            $ref: "#/definitions/Pet"
      responses:
        "200":
          description: created
          schema:
            $ref: "#/definitions/Pet"
definitions:
  Pet:
    properties:
      id:
        type: integer
      name:
        type: string
    required: [id, name]
    "##,
    ))
}

fn pets_post() -> OperationDescriptor {
    OperationDescriptor {
        method: "POST".to_string(),
        path: "/pets".to_string(),
        parameters: vec![json!({
            "name": "body",
            "in": "body",
            "required": true,
            "schema": {"$ref": "#/definitions/Pet"}
        })],
        consumes: vec!["application/x-www-form-urlencoded".to_string()],
        ..Default::default()
    }
}

#[test]
fn test_content_type_negotiation_message_is_verbatim() {
    let validator = SpecValidator::new(Version::V2_0).unwrap();
    let requests = RequestValidator::new(&validator);
    let document = petstore();

    // No content-type header falls back to the default media type.
    let request = IncomingRequest::new("POST").with_body(json!({"id": 1, "name": "Test Pet"}));
    let err = requests
        .validate(&document, &pets_post(), &request)
        .unwrap_err();
    assert!(err.failed_validation);
    assert_eq!(
        err.message,
        "Invalid content type (application/octet-stream).  These are valid: application/x-www-form-urlencoded"
    );
}

#[test]
fn test_content_type_parameters_are_stripped() {
    let validator = SpecValidator::new(Version::V2_0).unwrap();
    let requests = RequestValidator::new(&validator);
    let document = petstore();

    let request = IncomingRequest::new("POST")
        .with_header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8")
        .with_body(json!({"id": 1, "name": "Test Pet"}));
    assert!(requests.validate(&document, &pets_post(), &request).is_ok());
}

#[test]
fn test_methods_without_bodies_skip_content_negotiation() {
    let validator = SpecValidator::new(Version::V2_0).unwrap();
    let requests = RequestValidator::new(&validator);
    let document = petstore();

    let operation = OperationDescriptor {
        method: "GET".to_string(),
        path: "/pets".to_string(),
        consumes: vec!["application/json".to_string()],
        ..Default::default()
    };
    let request = IncomingRequest::new("GET").with_header("Content-Type", "text/plain");
    assert!(requests.validate(&document, &operation, &request).is_ok());
}

fn query_operation(parameter: Value) -> OperationDescriptor {
    OperationDescriptor {
        method: "GET".to_string(),
        path: "/pets".to_string(),
        parameters: vec![parameter],
        ..Default::default()
    }
}

#[test]
fn test_missing_required_parameter_without_default_fails() {
    let validator = SpecValidator::new(Version::V2_0).unwrap();
    let requests = RequestValidator::new(&validator);
    let document = petstore();

    let operation = query_operation(json!({
        "name": "mock", "in": "query", "type": "boolean", "required": true
    }));
    let err = requests
        .validate(&document, &operation, &IncomingRequest::new("GET"))
        .unwrap_err();
    assert_eq!(err.message, "Parameter (mock) is required");
}

#[test]
fn test_missing_required_parameter_with_default_passes() {
    let validator = SpecValidator::new(Version::V2_0).unwrap();
    let requests = RequestValidator::new(&validator);
    let document = petstore();

    let operation = query_operation(json!({
        "name": "mock", "in": "query", "type": "boolean",
        "required": true, "default": "false"
    }));
    assert!(requests
        .validate(&document, &operation, &IncomingRequest::new("GET"))
        .is_ok());
}

#[test]
fn test_invalid_integer_query_parameter() {
    let validator = SpecValidator::new(Version::V2_0).unwrap();
    let requests = RequestValidator::new(&validator);
    let document = petstore();

    let operation = query_operation(json!({
        "name": "arg0", "in": "query", "type": "integer", "required": true
    }));

    let bad = IncomingRequest::new("GET").with_query("arg0", json!("fake"));
    let err = requests.validate(&document, &operation, &bad).unwrap_err();
    assert_eq!(err.message, "Parameter (arg0) is not a valid integer: fake");

    let good = IncomingRequest::new("GET").with_query("arg0", json!("1"));
    assert!(requests.validate(&document, &operation, &good).is_ok());
}

#[test]
fn test_body_model_validation() {
    let validator = SpecValidator::new(Version::V2_0).unwrap();
    let requests = RequestValidator::new(&validator);
    let document = petstore();

    let bad = IncomingRequest::new("POST")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body(json!({}));
    let err = requests.validate(&document, &pets_post(), &bad).unwrap_err();
    assert!(err.failed_validation);
    assert_eq!(err.message, "Parameter (body) is not a valid Pet model");

    let good = IncomingRequest::new("POST")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body(json!({"id": 1, "name": "Test Pet"}));
    assert!(requests.validate(&document, &pets_post(), &good).is_ok());
}

#[test]
fn test_array_body_is_validated_per_element() {
    let validator = SpecValidator::new(Version::V2_0).unwrap();
    let requests = RequestValidator::new(&validator);
    let document = petstore();

    let operation = OperationDescriptor {
        method: "POST".to_string(),
        path: "/pets".to_string(),
        parameters: vec![json!({
            "name": "body",
            "in": "body",
            "required": true,
            "schema": {"type": "array", "items": {"$ref": "#/definitions/Pet"}}
        })],
        ..Default::default()
    };

    let bad = IncomingRequest::new("POST")
        .with_body(json!([{"id": 1, "name": "ok"}, {"id": 2}]));
    let err = requests.validate(&document, &operation, &bad).unwrap_err();
    assert_eq!(err.message, "Parameter (body) is not a valid Pet model");

    let good = IncomingRequest::new("POST")
        .with_body(json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]));
    assert!(requests.validate(&document, &operation, &good).is_ok());
}

#[test]
fn test_v1_form_parameter_and_default_value() {
    let listing = yaml(
        r##"
swaggerVersion: "1.2"
apis:
  - path: /pet
    "##,
    );
    let declaration = yaml(
        r##"
swaggerVersion: "1.2"
basePath: http://localhost/api
resourcePath: /pet
apis:
  - path: /pet
    operations:
      - method: POST
        nickname: addPet
        type: void
        parameters:
          - paramType: form
            name: status
            type: string
            required: true
            defaultValue: available
            enum: [available, pending, sold]
    "##,
    );
    let document = SpecDocument::v1(listing, vec![declaration]);
    let validator = SpecValidator::new(Version::V1_2).unwrap();
    let requests = RequestValidator::new(&validator);

    let operation = OperationDescriptor {
        method: "POST".to_string(),
        path: "/pet".to_string(),
        parameters: vec![json!({
            "paramType": "form",
            "name": "status",
            "type": "string",
            "required": true,
            "defaultValue": "available",
            "enum": ["available", "pending", "sold"]
        })],
        ..Default::default()
    };

    // Omitted form field picks up the declared default, which is allowable.
    assert!(requests
        .validate(&document, &operation, &IncomingRequest::new("POST"))
        .is_ok());

    let bad = IncomingRequest::new("POST").with_form("status", json!("lost"));
    let err = requests.validate(&document, &operation, &bad).unwrap_err();
    assert_eq!(
        err.message,
        "Parameter (status) is not an allowable value (available, pending, sold): lost"
    );
}

#[test]
fn test_method_not_allowed_condition() {
    let defined = vec!["get".to_string(), "delete".to_string()];
    let err = check_method_allowed("PUT", &defined).unwrap_err();
    assert_eq!(err.allow_header(), "DELETE, GET");
    assert_eq!(
        err.to_string(),
        "Route defined in Swagger specification but there is no defined put operation."
    );
    assert!(check_method_allowed("delete", &defined).is_ok());
}
