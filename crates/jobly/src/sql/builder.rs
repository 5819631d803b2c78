use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::row::FromRow;
use std::fmt::Write;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Maximum number of SQL bytes emitted in `jobly.sql` debug events.
const MAX_LOGGED_SQL: usize = 200;

#[derive(Debug)]
enum Piece {
    Text(String),
    Placeholder,
}

type Param = Arc<dyn ToSql + Sync + Send>;

/// SQL text with positional parameters that number themselves.
///
/// Text and bound values are kept apart; `$n` markers are only produced by
/// [`Sql::to_sql`], in the order placeholders were pushed. A fragment built
/// on its own (a filter condition, a WHERE clause) can therefore be spliced
/// into a larger statement with [`Sql::push_sql`] and still number correctly.
#[must_use]
#[derive(Default)]
pub struct Sql {
    pieces: Vec<Piece>,
    params: Vec<Param>,
    tag: Option<String>,
}

impl std::fmt::Debug for Sql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sql")
            .field("sql", &self.to_sql())
            .field("param_count", &self.params.len())
            .field("tag", &self.tag)
            .finish()
    }
}

impl Sql {
    pub fn new(text: impl Into<String>) -> Self {
        let mut sql = Self::empty();
        sql.pieces.push(Piece::Text(text.into()));
        sql
    }

    /// A builder with no text and no parameters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Label reported in the `jobly.sql` debug event.
    pub fn tagged(self, tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..self
        }
    }

    /// True when nothing would be sent: no text and no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
            && self
                .pieces
                .iter()
                .all(|piece| matches!(piece, Piece::Text(text) if text.is_empty()))
    }

    /// Append literal SQL text.
    pub fn push(&mut self, text: &str) -> &mut Self {
        if !text.is_empty() {
            if let Some(Piece::Text(tail)) = self.pieces.last_mut() {
                tail.push_str(text);
            } else {
                self.pieces.push(Piece::Text(text.to_owned()));
            }
        }
        self
    }

    /// Append a `$n` placeholder for `value`.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.pieces.push(Piece::Placeholder);
        self.params.push(Arc::new(value));
        self
    }

    /// Add a parameter for text that already numbers its own placeholders.
    ///
    /// Do not combine with [`Sql::push_bind`] on one statement: both number
    /// from `$1`. Execution rejects a statement whose generated placeholders
    /// and params disagree in count.
    ///
    /// ```ignore
    /// sql("DELETE FROM jobs WHERE id = $1 RETURNING id")
    ///     .bind(7)
    ///     .fetch_opt(&conn)
    ///     .await?;
    /// ```
    pub fn bind<T>(mut self, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.params.push(Arc::new(value));
        self
    }

    /// Splice `fragment` onto the end; its placeholders keep counting.
    pub fn push_sql(&mut self, fragment: Sql) -> &mut Self {
        let Sql {
            pieces,
            params,
            tag,
        } = fragment;
        self.pieces.extend(pieces);
        self.params.extend(params);
        self.tag = self.tag.take().or(tag);
        self
    }

    /// Append ` WHERE <fragment>` unless the fragment is empty.
    pub fn push_where(&mut self, fragment: Sql) -> &mut Self {
        if !fragment.is_empty() {
            self.push(" WHERE ");
            self.push_sql(fragment);
        }
        self
    }

    /// The statement text with `$1, $2, ...` filled in.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut next = 1usize;
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Placeholder => {
                    let _ = write!(out, "${next}");
                    next += 1;
                }
            }
        }
        out
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Borrowed parameters in the shape `tokio-postgres` expects.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|param| &**param as &(dyn ToSql + Sync))
            .collect()
    }

    fn validate(&self) -> JoblyResult<()> {
        // Text without generated placeholders numbers itself via `bind()`.
        let placeholders = self
            .pieces
            .iter()
            .filter(|piece| matches!(piece, Piece::Placeholder))
            .count();
        if placeholders > 0 && placeholders != self.params.len() {
            return Err(JoblyError::InvalidSql(format!(
                "{placeholders} placeholders but {} params",
                self.params.len()
            )));
        }
        Ok(())
    }

    fn prepare(&self) -> JoblyResult<String> {
        self.validate()?;
        let sql = self.to_sql();
        tracing::debug!(
            target: "jobly.sql",
            tag = self.tag.as_deref().unwrap_or("-"),
            param_count = self.params.len(),
            sql = %truncate_sql_bytes(&sql, MAX_LOGGED_SQL),
        );
        Ok(sql)
    }

    /// All result rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        let sql = self.prepare()?;
        let params = self.params_ref();
        conn.query(&sql, &params).await
    }

    /// All result rows as `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// The first row, if any.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JoblyResult<Option<Row>> {
        let sql = self.prepare()?;
        let params = self.params_ref();
        conn.query_opt(&sql, &params).await
    }

    /// The first row as `T`, if any.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// The first row as `T`; `NotFound` when the statement returns nothing.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        let sql = self.prepare()?;
        let params = self.params_ref();
        let row = conn.query_one(&sql, &params).await?;
        T::from_row(&row)
    }

    /// Number of affected rows.
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        let sql = self.prepare()?;
        let params = self.params_ref();
        conn.execute(&sql, &params).await
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
