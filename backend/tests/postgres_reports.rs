//! Reports and table access against a live PostgreSQL.
//!
//! Each run creates its own schema and connects through
//! [`PgExecutor::connect`], which points every connection's `search_path`
//! at it. Report SQL (unqualified table names) and the generic CRUD
//! (qualified with the configured schema) must then see the same tables.
//!
//! Skipped unless DEALERDB_TEST_DB_URL or DATABASE_URL is set.

use std::sync::Arc;

use dealerdb_backend::services::DataService;
use dealerdb_query::{
    FilterSet, Identifier, IdentifierKind, PgExecutor, Row, SqlValue, UpsertKind,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

fn test_db_url() -> Option<String> {
    std::env::var("DEALERDB_TEST_DB_URL")
        .ok()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

const SCHEMA_DDL: &str = r#"
CREATE TYPE car_status AS ENUM ('available', 'reserved', 'sold');
CREATE TABLE clients (
    id SERIAL PRIMARY KEY,
    first_name VARCHAR(50) NOT NULL,
    last_name VARCHAR(50) NOT NULL
);
CREATE TABLE employees (
    id SERIAL PRIMARY KEY,
    first_name VARCHAR(50) NOT NULL,
    last_name VARCHAR(50) NOT NULL,
    position VARCHAR(50),
    salary NUMERIC(10, 2)
);
CREATE TABLE brands (
    id SERIAL PRIMARY KEY,
    name VARCHAR(50) NOT NULL
);
CREATE TABLE models (
    id SERIAL PRIMARY KEY,
    name VARCHAR(50) NOT NULL,
    generation VARCHAR(20),
    body_type VARCHAR(20),
    brand_id INTEGER REFERENCES brands(id)
);
CREATE TABLE cars (
    id SERIAL PRIMARY KEY,
    model_id INTEGER REFERENCES models(id),
    vin_code VARCHAR(17),
    year_manufacture INTEGER,
    mileage INTEGER,
    price NUMERIC(12, 2),
    status car_status NOT NULL DEFAULT 'available'
);
CREATE TABLE sales (
    id SERIAL PRIMARY KEY,
    sale_date TIMESTAMP NOT NULL,
    final_price NUMERIC(12, 2) NOT NULL,
    client_id INTEGER REFERENCES clients(id),
    car_id INTEGER
);
CREATE TABLE services (
    id SERIAL PRIMARY KEY,
    name VARCHAR(50) NOT NULL
);
CREATE TABLE appointments (
    id SERIAL PRIMARY KEY,
    appointment_date TIMESTAMP NOT NULL,
    status VARCHAR(20),
    final_cost NUMERIC(10, 2),
    sale_id INTEGER REFERENCES sales(id),
    service_id INTEGER REFERENCES services(id)
);
"#;

const SEED: &str = r#"
INSERT INTO clients (first_name, last_name) VALUES
    ('Ann', 'Lee'), ('Bob', 'Stone'), ('Cid', 'Moss'),
    ('Dan', 'Reed'), ('Eve', 'Hart'), ('Fay', 'Cole');
INSERT INTO employees (first_name, last_name, position, salary) VALUES
    ('John', 'Smith', 'Manager', 5000.00),
    ('Mary', 'Blacksmith', 'Seller', 3200.00),
    ('Paul', 'Green', 'Mechanic', 2800.00);
INSERT INTO brands (name) VALUES ('Volkswagen'), ('Skoda');
INSERT INTO models (name, generation, body_type, brand_id) VALUES
    ('Golf', 'VIII', 'hatchback', 1),
    ('Octavia', 'IV', 'liftback', 2);
INSERT INTO cars (model_id, vin_code, year_manufacture, mileage, price, status) VALUES
    (1, 'VIN0000000000001', 2021, 30000, 10500.00, 'sold'),
    (2, 'VIN0000000000002', 2022, 12000, 20500.00, 'sold'),
    (2, 'VIN0000000000003', 2023, 5000, 30500.25, 'sold'),
    (1, 'VIN0000000000004', 2019, 80000, 15500.00, 'sold'),
    (1, 'VIN0000000000005', 2015, 150000, 5500.00, 'sold'),
    (2, 'VIN0000000000006', 2012, 210000, 1200.00, 'sold');
INSERT INTO sales (sale_date, final_price, client_id, car_id) VALUES
    ('2024-05-03 10:00:00', 10000.00, 1, 1),
    ('2024-05-20 15:30:00', 20000.00, 2, 2),
    ('2024-06-01 09:00:00', 30000.00, 3, 3),
    ('2023-11-11 12:00:00', 15000.00, 4, 4),
    ('2024-06-15 12:00:00', 5000.00, 5, 5),
    ('2024-06-16 12:00:00', 1000.00, 6, 6),
    ('2024-06-16 18:00:00', 500.00, 6, 42);
INSERT INTO services (name) VALUES ('Oil change'), ('Tyre fitting');
INSERT INTO appointments (appointment_date, status, final_cost, sale_id, service_id) VALUES
    ('2024-05-10 09:00:00', 'done', 150.50, 1, 1),
    ('2024-05-12 11:00:00', 'planned', 80.00, 1, 2),
    ('2024-06-05 14:00:00', 'done', 99.99, 3, 1);
"#;

struct TestDb {
    admin: PgPool,
    schema: String,
    service: DataService,
}

impl TestDb {
    async fn create(db_url: &str) -> TestDb {
        let schema = format!("dealerdb_test_{}", uuid::Uuid::new_v4().simple());

        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(db_url)
            .await
            .expect("test database should be reachable");
        admin
            .execute(format!("CREATE SCHEMA {}", schema).as_str())
            .await
            .expect("schema should be created");

        let schema_id =
            Identifier::parse(IdentifierKind::Schema, &schema).expect("schema name is an identifier");
        let executor = PgExecutor::connect(db_url, 2, &schema_id)
            .await
            .expect("pool should connect");

        executor
            .pool()
            .execute(SCHEMA_DDL)
            .await
            .expect("tables should be created");
        executor.pool().execute(SEED).await.expect("seed should load");

        let service = DataService::new(Arc::new(executor), schema_id);

        TestDb {
            admin,
            schema,
            service,
        }
    }

    async fn cleanup(self) {
        let _ = self
            .admin
            .execute(format!("DROP SCHEMA {} CASCADE", self.schema).as_str())
            .await;
    }
}

fn row(value: Value) -> Row {
    let object = value.as_object().cloned().expect("row literal is an object");
    Row::from_json(object).expect("row literal is valid")
}

/// Parses filters the same way the report handler does.
fn filters(pairs: &[(&str, &str)]) -> FilterSet {
    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    let uri: axum::http::Uri = format!("/api/reports/x?{}", query).parse().expect("uri");
    axum::extract::Query::<FilterSet>::try_from_uri(&uri)
        .expect("filters should parse")
        .0
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reports_and_tables_against_postgres() {
    let Some(db_url) = test_db_url() else {
        eprintln!("skipping postgres report test; set DEALERDB_TEST_DB_URL to enable");
        return;
    };

    let db = TestDb::create(&db_url).await;
    let service = &db.service;

    let top = service
        .report("top-clients", &FilterSet::default())
        .await
        .expect("top-clients should run");
    assert_eq!(top.len(), 5);
    assert_eq!(top[0]["client"], "Cid Moss");
    assert_eq!(top[0]["total"].to_string(), "30000.00");

    let top_two = service
        .report("top-clients", &filters(&[("limit", "2")]))
        .await
        .expect("limited top-clients should run");
    assert_eq!(top_two.len(), 2);

    let may = service
        .report("sales-monthly", &filters(&[("year", "2024"), ("month", "5")]))
        .await
        .expect("sales-monthly should run");
    assert_eq!(may.len(), 2);
    assert_eq!(may[0]["sale_date"], "2024-05-03T10:00:00");

    let year_2024 = service
        .report("sales-monthly", &filters(&[("year", "2024")]))
        .await
        .expect("sales by year should run");
    assert_eq!(year_2024.len(), 6);

    let daily = service
        .report(
            "profit",
            &filters(&[("from", "2024-06-15"), ("to", "2024-06-16")]),
        )
        .await
        .expect("daily profit should run");
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[1]["total_profit"].to_string(), "1500.00");

    let monthly = service
        .report("profit", &FilterSet::default())
        .await
        .expect("monthly profit should run");
    assert_eq!(monthly[0]["month"], "2023-12-01T00:00:00");

    let smiths = service
        .report("employees", &filters(&[("q", "smith")]))
        .await
        .expect("employee search should run");
    let last_names = smiths
        .iter()
        .map(|row| row["last_name"].as_str().unwrap_or_default())
        .collect::<Vec<_>>();
    assert_eq!(last_names, ["Blacksmith", "Smith"]);

    let fallback = service
        .report("nope", &FilterSet::default())
        .await
        .expect("unknown report should run");
    assert_eq!(fallback.len(), 1);
    assert_eq!(fallback[0]["test"], "Test");

    let by_number = service
        .fetch_by_fk("sales", "car_id", "42")
        .await
        .expect("integer lookup should run");
    assert_eq!(by_number.len(), 1);

    let by_text = service
        .fetch_by_fk("clients", "last_name", "Moss")
        .await
        .expect("text lookup should run");
    assert_eq!(by_text[0]["first_name"], "Cid");

    let mut new_client = Row::default();
    new_client.push(
        Identifier::column("first_name").expect("column"),
        SqlValue::from("Gus"),
    );
    new_client.push(
        Identifier::column("last_name").expect("column"),
        SqlValue::from("Wolf"),
    );
    service
        .save_row("clients", new_client)
        .await
        .expect("insert should run");
    let clients = service.fetch_all("clients").await.expect("select should run");
    assert_eq!(clients.len(), 7);

    let relations = service
        .relations(Some("clients"))
        .await
        .expect("relations should load");
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].fk_table, "sales");
    assert_eq!(relations[0].pk_column, "id");

    db.cleanup().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sold_cars_and_services_against_postgres() {
    let Some(db_url) = test_db_url() else {
        eprintln!("skipping postgres report test; set DEALERDB_TEST_DB_URL to enable");
        return;
    };

    let db = TestDb::create(&db_url).await;
    let service = &db.service;

    let all_sold = service
        .report("sold-cars", &FilterSet::default())
        .await
        .expect("sold-cars should run");
    // the sale of car 42 has no car row and drops out of the join
    assert_eq!(all_sold.len(), 6);

    // both ends of the range are inclusive
    let in_range = service
        .report(
            "sold-cars",
            &filters(&[("from", "2024-05-20T15:30:00"), ("to", "2024-06-01T09:00:00")]),
        )
        .await
        .expect("sold-cars in range should run");
    assert_eq!(in_range.len(), 2);
    assert_eq!(in_range[0]["sale_date"], "2024-05-20T15:30:00");
    assert_eq!(in_range[1]["sale_date"], "2024-06-01T09:00:00");
    assert_eq!(in_range[1]["brand"], "Skoda");
    assert_eq!(in_range[1]["model"], "Octavia");
    assert_eq!(in_range[1]["vin_code"], "VIN0000000000003");
    assert_eq!(in_range[1]["year_manufacture"], 2023);
    assert_eq!(in_range[1]["car_price"].to_string(), "30500.25");
    assert_eq!(in_range[1]["car_status"], "sold");

    let for_sale = service
        .report("services-sales", &filters(&[("saleId", "1")]))
        .await
        .expect("services for one sale should run");
    assert_eq!(for_sale.len(), 2);
    assert!(for_sale.iter().all(|row| row["sale_id"] == 1));
    assert_eq!(for_sale[0]["service"], "Oil change");
    assert_eq!(for_sale[0]["final_cost"].to_string(), "150.50");
    assert_eq!(for_sale[1]["status"], "planned");

    let all_services = service
        .report("services-sales", &FilterSet::default())
        .await
        .expect("all services should run");
    assert_eq!(all_services.len(), 3);

    db.cleanup().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn null_values_reach_integer_columns() {
    let Some(db_url) = test_db_url() else {
        eprintln!("skipping postgres report test; set DEALERDB_TEST_DB_URL to enable");
        return;
    };

    let db = TestDb::create(&db_url).await;
    let service = &db.service;

    let inserted = service
        .save_row(
            "cars",
            row(json!({"model_id": null, "vin_code": "VIN0000000000007", "mileage": null})),
        )
        .await
        .expect("insert with null integers should run");
    assert_eq!(inserted, UpsertKind::Insert);

    let added = service
        .fetch_by_fk("cars", "vin_code", "VIN0000000000007")
        .await
        .expect("lookup should run");
    assert_eq!(added.len(), 1);
    assert_eq!(added[0]["model_id"], Value::Null);
    assert_eq!(added[0]["mileage"], Value::Null);
    assert_eq!(added[0]["status"], "available");

    let updated = service
        .save_row("sales", row(json!({"id": 7, "client_id": null})))
        .await
        .expect("update to null should run");
    assert_eq!(updated, UpsertKind::Update);

    let sale = service
        .fetch_by_fk("sales", "car_id", "42")
        .await
        .expect("lookup should run");
    assert_eq!(sale[0]["client_id"], Value::Null);
    assert_eq!(sale[0]["final_price"].to_string(), "500.00");

    db.cleanup().await;
}
