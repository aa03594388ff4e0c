//! Postgres-backed `ClientStore` implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{Client, ClientStatus, Deployment};
use crate::store::{ClientFilter, ClientPage, ClientStore, NewClient, PlatformStats};

const CLIENT_COLUMNS: &str = "id, name, domain, template, contact_email, deployment_url, \
     admin_url, datastore_url, project_id, status, plan, features, created_at, updated_at, \
     suspended_at, suspension_reason";

/// Client store backed by a Postgres pool.
pub struct PgClientStore {
    pool: PgPool,
}

impl PgClientStore {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run pending schema migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Access the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_client(&self, id: Uuid) -> StoreResult<Client> {
        self.get_client(id)
            .await?
            .ok_or(StoreError::ClientNotFound(id))
    }
}

#[async_trait]
impl ClientStore for PgClientStore {
    async fn insert_client(&self, new: NewClient) -> StoreResult<Client> {
        // The partial unique index on (domain) enforces this too; checking
        // first gives the caller a typed error instead of a constraint code.
        if self.find_by_domain(&new.domain).await?.is_some() {
            return Err(StoreError::DuplicateDomain(new.domain));
        }

        let client = sqlx::query_as::<_, Client>(&format!(
            r"
            INSERT INTO clients
                (id, name, domain, template, contact_email, deployment_url, admin_url,
                 datastore_url, project_id, status, plan, features)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'active', $10, $11)
            RETURNING {CLIENT_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.domain)
        .bind(&new.template)
        .bind(&new.contact_email)
        .bind(&new.deployment_url)
        .bind(&new.admin_url)
        .bind(&new.datastore_url)
        .bind(&new.project_id)
        .bind(&new.plan)
        .bind(&new.features)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    async fn get_client(&self, id: Uuid) -> StoreResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    async fn find_by_domain(&self, domain: &str) -> StoreResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE domain = $1 AND status <> 'deleted'"
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    async fn list_clients(&self, filter: &ClientFilter) -> StoreResult<ClientPage> {
        let conditions = r"
            ($1::client_status IS NULL OR status = $1)
            AND ($2::text IS NULL OR template = $2)
            AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%' OR domain ILIKE '%' || $3 || '%')
        ";

        let clients = sqlx::query_as::<_, Client>(&format!(
            r"
            SELECT {CLIENT_COLUMNS} FROM clients
            WHERE {conditions}
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "
        ))
        .bind(filter.status)
        .bind(&filter.template)
        .bind(&filter.search)
        .bind(i64::from(filter.per_page()))
        .bind(i64::from(filter.offset()))
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM clients WHERE {conditions}"
        ))
        .bind(filter.status)
        .bind(&filter.template)
        .bind(&filter.search)
        .fetch_one(&self.pool)
        .await?;

        Ok(ClientPage {
            clients,
            total: total.max(0) as u64,
            page: filter.page(),
            per_page: filter.per_page(),
        })
    }

    async fn update_client(&self, client: &Client) -> StoreResult<Client> {
        let updated = sqlx::query_as::<_, Client>(&format!(
            r"
            UPDATE clients
            SET name = $2,
                contact_email = $3,
                plan = $4,
                features = $5,
                deployment_url = $6,
                admin_url = $7,
                project_id = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "
        ))
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.contact_email)
        .bind(&client.plan)
        .bind(&client.features)
        .bind(&client.deployment_url)
        .bind(&client.admin_url)
        .bind(&client.project_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::ClientNotFound(client.id))?;

        Ok(updated)
    }

    async fn set_status(&self, id: Uuid, next: ClientStatus) -> StoreResult<Client> {
        let current = self.fetch_client(id).await?;
        if !current.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                from: current.status,
                to: next,
            });
        }

        let updated = sqlx::query_as::<_, Client>(&format!(
            r"
            UPDATE clients
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(next)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(client_id = %id, from = %current.status, to = %next, "Client status changed");
        Ok(updated)
    }

    async fn suspend(&self, id: Uuid, reason: &str) -> StoreResult<Client> {
        let current = self.fetch_client(id).await?;
        if !current.status.can_transition_to(ClientStatus::Suspended) {
            return Err(StoreError::InvalidTransition {
                from: current.status,
                to: ClientStatus::Suspended,
            });
        }

        let updated = sqlx::query_as::<_, Client>(&format!(
            r"
            UPDATE clients
            SET status = 'suspended',
                suspended_at = NOW(),
                suspension_reason = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn activate(&self, id: Uuid) -> StoreResult<Client> {
        let current = self.fetch_client(id).await?;
        if !current.status.can_transition_to(ClientStatus::Active) {
            return Err(StoreError::InvalidTransition {
                from: current.status,
                to: ClientStatus::Active,
            });
        }

        let updated = sqlx::query_as::<_, Client>(&format!(
            r"
            UPDATE clients
            SET status = 'active',
                suspended_at = NULL,
                suspension_reason = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn insert_deployment(&self, deployment: Deployment) -> StoreResult<Deployment> {
        let row = sqlx::query_as::<_, Deployment>(
            r#"
            INSERT INTO deployments (id, client_id, status, url, trigger, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, client_id, status, url, trigger, created_at
            "#,
        )
        .bind(deployment.id)
        .bind(deployment.client_id)
        .bind(&deployment.status)
        .bind(&deployment.url)
        .bind(deployment.trigger)
        .bind(deployment.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_deployments(&self, client_id: Uuid) -> StoreResult<Vec<Deployment>> {
        let rows = sqlx::query_as::<_, Deployment>(
            r#"
            SELECT id, client_id, status, url, trigger, created_at
            FROM deployments
            WHERE client_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn stats(&self) -> StoreResult<PlatformStats> {
        let rows: Vec<(ClientStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM clients GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let (total_deployments,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM deployments")
            .fetch_one(&self.pool)
            .await?;

        let mut stats = PlatformStats {
            total_deployments: total_deployments.max(0) as u64,
            ..Default::default()
        };
        for (status, count) in rows {
            let count = count.max(0) as u64;
            stats.total_clients += count;
            match status {
                ClientStatus::Active => stats.active = count,
                ClientStatus::Suspended => stats.suspended = count,
                ClientStatus::Failed => stats.failed = count,
                ClientStatus::Deploying => stats.deploying = count,
                ClientStatus::Deleted => stats.deleted = count,
                _ => {}
            }
        }
        Ok(stats)
    }
}
