use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::debug;

use crate::{
    entities::filme,
    error::{AppError, AppResult},
    models::{CreateFilmeDto, UpdateFilmeDto},
};

#[derive(Clone)]
pub struct FilmeStore {
    db: DatabaseConnection,
}

impl FilmeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, skip: u64, take: u64) -> AppResult<Vec<filme::Model>> {
        let films = filme::Entity::find()
            .order_by_asc(filme::Column::Id)
            .offset(skip)
            .limit(take)
            .all(&self.db)
            .await?;
        debug!(skip, take, count = films.len(), "listed filmes");
        Ok(films)
    }

    pub async fn all(&self) -> AppResult<Vec<filme::Model>> {
        let films = filme::Entity::find().order_by_asc(filme::Column::Id).all(&self.db).await?;
        Ok(films)
    }

    pub async fn find(&self, id: i32) -> AppResult<Option<filme::Model>> {
        Ok(filme::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn get(&self, id: i32) -> AppResult<filme::Model> {
        self.find(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, dto: CreateFilmeDto) -> AppResult<filme::Model> {
        let model = new_filme(dto).insert(&self.db).await?;
        debug!(id = model.id, "created filme");
        Ok(model)
    }

    /// Inserts every filme in a single transaction.
    pub async fn create_many(&self, dtos: Vec<CreateFilmeDto>) -> AppResult<Vec<filme::Model>> {
        if dtos.is_empty() {
            return Ok(Vec::new());
        }

        let txn = self.db.begin().await?;
        let mut created = Vec::with_capacity(dtos.len());
        for dto in dtos {
            created.push(new_filme(dto).insert(&txn).await?);
        }
        txn.commit().await?;

        debug!(count = created.len(), "created filmes");
        Ok(created)
    }

    /// Overwrites every mutable field of an existing filme.
    pub async fn update(&self, id: i32, dto: UpdateFilmeDto) -> AppResult<filme::Model> {
        let current = self.get(id).await?;
        self.write(current, dto).await
    }

    pub async fn write(&self, current: filme::Model, dto: UpdateFilmeDto) -> AppResult<filme::Model> {
        let id = current.id;
        let mut active: filme::ActiveModel = current.into();
        active.nome = Set(dto.nome);
        active.genero = Set(dto.genero);
        active.duracao = Set(dto.duracao);
        // The row can disappear between the read and this write.
        let model = active.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => not_found(id),
            e => e.into(),
        })?;
        debug!(id = model.id, "updated filme");
        Ok(model)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = filme::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(not_found(id));
        }
        debug!(id, "deleted filme");
        Ok(())
    }
}

fn new_filme(dto: CreateFilmeDto) -> filme::ActiveModel {
    filme::ActiveModel {
        id: Default::default(),
        nome: Set(dto.nome),
        genero: Set(dto.genero),
        duracao: Set(dto.duracao),
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("filme {id} not found"))
}
