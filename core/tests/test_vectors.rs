//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use serde_json::Value;
use todo_client::{
    ClientError, CreateTodo, HttpMethod, HttpRequest, HttpResponse, ListQuery, Todo, TodoClient,
    TodoId, TodoList, UpdateTodo,
};

const BASE_URL: &str = "http://localhost:3000";

fn client() -> TodoClient {
    TodoClient::parse(BASE_URL).unwrap()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn check_error(name: &str, err: &ClientError, expected: &Value) {
    match expected["kind"].as_str().unwrap() {
        "validation" => assert!(matches!(err, ClientError::Validation(_)), "{name}: expected validation failure, got {err:?}"),
        "api" => {
            let ClientError::Api(api) = err else {
                panic!("{name}: expected API failure, got {err:?}");
            };
            assert_eq!(api.code.as_str(), expected["code"].as_str().unwrap(), "{name}: code");
            assert_eq!(api.message, expected["message"].as_str().unwrap(), "{name}: message");
            assert_eq!(api.request_id.as_deref(), expected["requestId"].as_str(), "{name}: requestId");
            let fields = api.fields.as_ref().map(|f| serde_json::to_value(f).unwrap());
            assert_eq!(fields.as_ref(), expected.get("fields"), "{name}: fields");
        }
        other => panic!("{name}: unknown error kind: {other}"),
    }
}

/// Compare a parse result against `expected_result` or `expected_error`.
fn check_outcome<T>(name: &str, case: &Value, result: Result<T, ClientError>)
where
    T: serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    if let Some(expected_error) = case.get("expected_error") {
        check_error(name, &result.unwrap_err(), expected_error);
    } else {
        let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(result.unwrap(), expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();
        let query: ListQuery = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_list_todos(&query).unwrap();
        check_request(name, &req, &case["expected_request"]);

        check_outcome::<TodoList>(name, &case, c.parse_list_todos(simulated(&case)));
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let input: CreateTodo = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_create_todo(&input).unwrap();
        check_request(name, &req, &case["expected_request"]);

        check_outcome::<Todo>(name, &case, c.parse_create_todo(simulated(&case)));
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let id = TodoId::new(case["input_id"].as_str().unwrap());
        let input: UpdateTodo = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_update_todo(&id, &input).unwrap();
        check_request(name, &req, &case["expected_request"]);

        check_outcome::<Todo>(name, &case, c.parse_update_todo(simulated(&case)));
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let id = TodoId::new(case["input_id"].as_str().unwrap());

        let req = c.build_delete_todo(&id).unwrap();
        check_request(name, &req, &case["expected_request"]);

        check_outcome::<Todo>(name, &case, c.parse_delete_todo(simulated(&case)));
    }
}
