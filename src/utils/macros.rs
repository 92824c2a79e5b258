#[macro_export]
macro_rules! map_struct {
    ($src:expr => $dst:ident { $($field:ident),+ $(,)? }) => {
        $dst {
            $(
                $field: $src.$field,
            )+
        }
    };
}

#[macro_export]
macro_rules! get_conn {
    ($state:expr) => {
        $crate::database::conn::LazyConn::new($state.db_pool.clone())
    };
}

#[macro_export]
macro_rules! create_tx {
    ($conn:expr) => {
        $conn.transaction().await?
    };
}
