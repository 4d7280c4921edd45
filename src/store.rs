//! Destination for normalized points.

use async_trait::async_trait;
use influxdb::{Client, ReadQuery, WriteQuery};
use log::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::StoreError;
use crate::point::NormalizedPoint;

/// Anything that accepts batches of points. An `Err` means the batch was
/// not stored.
#[async_trait]
pub trait PointStore {
    async fn write_points(&mut self, points: &[NormalizedPoint]) -> Result<(), StoreError>;
}

pub struct InfluxStore {
    client: Client,
    database: String,
}

impl InfluxStore {
    pub fn connect(conn: &ConnectionConfig) -> Self {
        let client =
            Client::new(conn.url(), conn.database.as_str()).with_auth(&conn.user, &conn.password);
        Self {
            client,
            database: conn.database.clone(),
        }
    }

    pub async fn recreate_database(&self) -> Result<(), StoreError> {
        info!("Deleting database {}", self.database);
        self.client
            .query(ReadQuery::new(format!("DROP DATABASE \"{}\"", self.database)))
            .await?;

        info!("Creating database {}", self.database);
        self.client
            .query(ReadQuery::new(format!("CREATE DATABASE \"{}\"", self.database)))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PointStore for InfluxStore {
    async fn write_points(&mut self, points: &[NormalizedPoint]) -> Result<(), StoreError> {
        let queries: Vec<WriteQuery> = points.iter().map(NormalizedPoint::to_query).collect();
        let response = self.client.query(queries).await?;
        debug!("Write response: {:?}", response);
        Ok(())
    }
}
