// ============================================================================
// Genomics API Tests
// ============================================================================
//
// End to end through the gateway under /genoma. Report creation and
// enrichment go to the real clinical service spawned alongside.
//
// ============================================================================

use serde_json::{json, Value};

mod test_utils;
use test_utils::{create_patient, spawn_gateway, spawn_genomics, TestStack};

async fn call(
    stack: &TestStack,
    token: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
) -> (u16, Value) {
    let mut request = stack
        .client
        .request(method, format!("{}{}", stack.gateway, path))
        .bearer_auth(token);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.unwrap();
    let status = response.status().as_u16();
    let text = response.text().await.unwrap();
    let value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap()
    };
    (status, value)
}

async fn create_gene(stack: &TestStack, token: &str, symbol: &str, full_name: &str) -> i64 {
    let (status, body) = call(
        stack,
        token,
        reqwest::Method::POST,
        "/genoma/genes",
        Some(json!({ "symbol": symbol, "full_name": full_name })),
    )
    .await;
    assert_eq!(status, 201, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn create_variant(stack: &TestStack, token: &str, gene_id: i64, impact: &str) -> String {
    let (status, body) = call(
        stack,
        token,
        reqwest::Method::POST,
        "/genoma/variants",
        Some(json!({
            "gene_id": gene_id,
            "chromosome": "17",
            "position": 7675088,
            "reference_base": "C",
            "alternate_base": "T",
            "impact": impact
        })),
    )
    .await;
    assert_eq!(status, 201, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_gene_crud_and_search() {
    let stack = TestStack::spawn().await;
    let token = stack.token().await;

    let tp53 = create_gene(&stack, &token, "TP53", "Tumor protein p53").await;
    create_gene(&stack, &token, "BRCA1", "BRCA1 DNA repair associated").await;

    let (status, body) = call(
        &stack,
        &token,
        reqwest::Method::POST,
        "/genoma/genes",
        Some(json!({ "symbol": "TP53" })),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["error_code"], "CONFLICT");

    let (status, found) = call(&stack, &token, reqwest::Method::GET, "/genoma/genes/search?symbol=brca", None).await;
    assert_eq!(status, 200);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["symbol"], "BRCA1");

    let (status, found) = call(&stack, &token, reqwest::Method::GET, "/genoma/genes/search?symbol=", None).await;
    assert_eq!(status, 200);
    assert_eq!(found, json!([]));

    let (status, listed) = call(&stack, &token, reqwest::Method::GET, "/genoma/genes?query=protein", None).await;
    assert_eq!(status, 200);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, updated) = call(
        &stack,
        &token,
        reqwest::Method::PUT,
        &format!("/genoma/genes/{}", tp53),
        Some(json!({ "function_summary": "Guardian of the genome" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(updated["symbol"], "TP53");
    assert_eq!(updated["full_name"], "Tumor protein p53");
    assert_eq!(updated["function_summary"], "Guardian of the genome");

    let (status, body) = call(&stack, &token, reqwest::Method::DELETE, &format!("/genoma/genes/{}", tp53), None).await;
    assert_eq!(status, 204);
    assert_eq!(body, Value::Null);

    let (status, _) = call(&stack, &token, reqwest::Method::GET, &format!("/genoma/genes/{}", tp53), None).await;
    assert_eq!(status, 404);

    let (status, _) = call(&stack, &token, reqwest::Method::GET, "/genoma/genes/abc", None).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_variant_queries() {
    let stack = TestStack::spawn().await;
    let token = stack.token().await;
    let gene_id = create_gene(&stack, &token, "KRAS", "KRAS proto-oncogene").await;

    create_variant(&stack, &token, gene_id, "Missense").await;
    create_variant(&stack, &token, gene_id, "Nonsense").await;

    let (status, body) = call(
        &stack,
        &token,
        reqwest::Method::POST,
        "/genoma/variants",
        Some(json!({ "gene_id": 999, "chromosome": "12" })),
    )
    .await;
    assert_eq!(status, 404, "{}", body);

    let (status, by_gene) = call(
        &stack,
        &token,
        reqwest::Method::GET,
        &format!("/genoma/variants/by-gene/{}", gene_id),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(by_gene.as_array().unwrap().len(), 2);
    assert_eq!(by_gene[0]["gene_symbol"], "KRAS");

    let (status, _) = call(&stack, &token, reqwest::Method::GET, "/genoma/variants/by-gene/999", None).await;
    assert_eq!(status, 404);

    let (status, by_impact) = call(
        &stack,
        &token,
        reqwest::Method::GET,
        "/genoma/variants/by-impact?impact=Nonsense",
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(by_impact.as_array().unwrap().len(), 1);
    assert_eq!(by_impact[0]["impact"], "Nonsense");

    let (status, body) = call(
        &stack,
        &token,
        reqwest::Method::GET,
        "/genoma/variants/by-impact?impact=Catastrophic",
        None,
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("Missense"));

    let (status, filtered) = call(
        &stack,
        &token,
        reqwest::Method::GET,
        &format!("/genoma/variants?gene_id={}&impact=Missense", gene_id),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(filtered.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_report_flow_with_clinical_lookup() {
    let stack = TestStack::spawn().await;
    let token = stack.token().await;
    let patient_id = create_patient(&stack.client, &stack.clinical, "Rosalind", "Franklin").await;

    let gene_id = create_gene(&stack, &token, "EGFR", "Epidermal growth factor receptor").await;
    let variant_id = create_variant(&stack, &token, gene_id, "Missense").await;

    let (status, report) = call(
        &stack,
        &token,
        reqwest::Method::POST,
        "/genoma/reports",
        Some(json!({
            "patient_id": patient_id,
            "variant_id": variant_id,
            "detection_date": "2024-06-01",
            "allele_frequency": 23.5
        })),
    )
    .await;
    assert_eq!(status, 201, "{}", report);
    assert_eq!(report["patient_name"], "Rosalind Franklin");
    assert_eq!(report["gene_symbol"], "EGFR");
    assert_eq!(report["impact"], "Missense");
    assert_eq!(report["chromosome"], "17");
    let report_id = report["id"].as_str().unwrap().to_string();

    let (status, by_patient) = call(
        &stack,
        &token,
        reqwest::Method::GET,
        &format!("/genoma/reports/by-patient/{}", patient_id),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(by_patient.as_array().unwrap().len(), 1);
    assert_eq!(by_patient[0]["patient_name"], "Rosalind Franklin");

    // variant and gene with dependants cannot be deleted
    let (status, _) = call(&stack, &token, reqwest::Method::DELETE, &format!("/genoma/variants/{}", variant_id), None).await;
    assert_eq!(status, 409);
    let (status, _) = call(&stack, &token, reqwest::Method::DELETE, &format!("/genoma/genes/{}", gene_id), None).await;
    assert_eq!(status, 409);

    let (status, updated) = call(
        &stack,
        &token,
        reqwest::Method::PATCH,
        &format!("/genoma/reports/{}", report_id),
        Some(json!({ "allele_frequency": 48.0 })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(updated["allele_frequency"], 48.0);
    assert_eq!(updated["detection_date"], "2024-06-01");

    let (status, _) = call(&stack, &token, reqwest::Method::DELETE, &format!("/genoma/reports/{}", report_id), None).await;
    assert_eq!(status, 204);
    let (status, _) = call(&stack, &token, reqwest::Method::DELETE, &format!("/genoma/variants/{}", variant_id), None).await;
    assert_eq!(status, 204);
}

#[tokio::test]
async fn test_report_for_unknown_patient_is_not_found() {
    let stack = TestStack::spawn().await;
    let token = stack.token().await;
    let gene_id = create_gene(&stack, &token, "ALK", "ALK receptor tyrosine kinase").await;
    let variant_id = create_variant(&stack, &token, gene_id, "Frameshift").await;
    let unknown = "5b0e7f3a-2d4c-4e8b-9f1a-0c6d7e8f9a0b";

    let (status, body) = call(
        &stack,
        &token,
        reqwest::Method::POST,
        "/genoma/reports",
        Some(json!({
            "patient_id": unknown,
            "variant_id": variant_id,
            "detection_date": "2024-06-01"
        })),
    )
    .await;
    assert_eq!(status, 404, "{}", body);

    let (status, listed) = call(&stack, &token, reqwest::Method::GET, "/genoma/reports", None).await;
    assert_eq!(status, 200);
    assert_eq!(listed, json!([]));

    let (status, _) = call(
        &stack,
        &token,
        reqwest::Method::GET,
        &format!("/genoma/reports/by-patient/{}", unknown),
        None,
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_unreachable_clinic_fails_report_creation_with_bad_gateway() {
    // Port 9 (discard) is closed on test hosts
    let genomics = spawn_genomics("http://127.0.0.1:9").await;
    let gateway = spawn_gateway(vec![("/genoma".to_string(), genomics)]).await;
    let client = reqwest::Client::new();
    let token = test_utils::login(&client, &gateway).await;

    let gene: Value = client
        .post(format!("{}/genoma/genes", gateway))
        .bearer_auth(&token)
        .json(&json!({ "symbol": "MYC" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let variant: Value = client
        .post(format!("{}/genoma/variants", gateway))
        .bearer_auth(&token)
        .json(&json!({ "gene_id": gene["id"] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(variant["impact"], "Unknown");

    let response = client
        .post(format!("{}/genoma/reports", gateway))
        .bearer_auth(&token)
        .json(&json!({
            "patient_id": "5b0e7f3a-2d4c-4e8b-9f1a-0c6d7e8f9a0b",
            "variant_id": variant["id"],
            "detection_date": "2024-06-01"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error_code"], "UPSTREAM_ERROR");
}
