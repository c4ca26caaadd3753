// src/server/routes.rs
//! Routes API pour le serveur KQL Dojo

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use log::debug;
use serde::{Serialize, Deserialize};
use warp::filters::body::json;
use warp::{Filter, Rejection, Reply};
use crate::{Dojo, QueryResult, TableInfo};

/// Requête pour exécuter une requête KQL
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Texte de la requête
    pub query: String,
}

/// Réponse générique pour l'API
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Statut de la réponse
    pub success: bool,
    /// Message d'erreur éventuel
    pub error: Option<String>,
    /// Données de la réponse
    pub data: Option<T>,
}

/// Crée les routes pour l'API KQL Dojo
pub fn api_routes(
    dojo: Arc<Dojo>,
    latency_ms: u64,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    // Route GET /api/tables
    let tables_route = warp::path!("api" / "tables")
        .and(warp::get())
        .and(with_dojo(dojo.clone()))
        .and_then(handle_tables);

    // Route POST /api/query
    let query_route = warp::path!("api" / "query")
        .and(warp::post())
        .and(json::<QueryRequest>())
        .and(with_dojo(dojo))
        .and(warp::any().map(move || latency_ms))
        .and_then(handle_query);

    tables_route.or(query_route)
}

/// Partage l'instance avec les gestionnaires
fn with_dojo(
    dojo: Arc<Dojo>
) -> impl Filter<Extract = (Arc<Dojo>,), Error = Infallible> + Clone {
    warp::any().map(move || dojo.clone())
}

/// Gestionnaire pour GET /api/tables
async fn handle_tables(dojo: Arc<Dojo>) -> Result<impl Reply, Rejection> {
    let response: ApiResponse<Vec<TableInfo>> = ApiResponse {
        success: true,
        error: None,
        data: Some(dojo.tables()),
    };
    Ok(warp::reply::json(&response))
}

/// Gestionnaire pour POST /api/query
async fn handle_query(
    req: QueryRequest,
    dojo: Arc<Dojo>,
    latency_ms: u64,
) -> Result<impl Reply, Rejection> {
    // Latence réseau simulée, sans effet sur l'exécution elle-même
    if latency_ms > 0 {
        tokio::time::sleep(Duration::from_millis(latency_ms)).await;
    }

    let result = dojo.execute(&req.query);
    debug!("Query returned {} rows in {:.3} ms", result.row_count, result.execution_time);

    let response: ApiResponse<QueryResult> = ApiResponse {
        success: !result.is_error(),
        error: result.error.clone(),
        data: Some(result),
    };
    Ok(warp::reply::json(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::Value;

    fn dojo() -> Arc<Dojo> {
        let rows = vec![
            vec![("A", Value::Integer(1)), ("B", Value::from("x"))].into_iter().collect(),
            vec![("A", Value::Integer(2)), ("B", Value::from("y"))].into_iter().collect(),
        ];
        Arc::new(Dojo::from_store(Box::new(MemoryStore::new().with_table("Sample", rows))))
    }

    #[tokio::test]
    async fn test_query_route() {
        let api = api_routes(dojo(), 0);
        let res = warp::test::request()
            .method("POST")
            .path("/api/query")
            .json(&QueryRequest { query: "Sample\n| where B == \"y\"".to_string() })
            .reply(&api)
            .await;

        assert_eq!(res.status(), 200);
        let body: ApiResponse<QueryResult> = serde_json::from_slice(res.body()).unwrap();
        assert!(body.success);
        let result = body.data.unwrap();
        assert_eq!(result.row_count, 1);
        assert_eq!(result.columns, vec!["A", "B"]);
        assert_eq!(result.rows[0].get("A"), Some(&Value::Integer(2)));
    }

    #[tokio::test]
    async fn test_query_route_reports_errors() {
        let api = api_routes(dojo(), 1);
        let res = warp::test::request()
            .method("POST")
            .path("/api/query")
            .json(&QueryRequest { query: "Missing".to_string() })
            .reply(&api)
            .await;

        let body: ApiResponse<QueryResult> = serde_json::from_slice(res.body()).unwrap();
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("Unknown table: Missing. Available tables: Sample"));
    }

    #[tokio::test]
    async fn test_tables_route() {
        let api = api_routes(dojo(), 0);
        let res = warp::test::request().method("GET").path("/api/tables").reply(&api).await;

        let body: ApiResponse<Vec<TableInfo>> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body.data.unwrap(), vec![TableInfo { name: "Sample".to_string(), rows: 2 }]);
    }
}
