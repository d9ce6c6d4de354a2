use sqlx::PgPool;

/// Creates every derived table if it doesn't already exist. Mirrors the
/// teacher's `db::schema::initialize_database` — plain `sqlx::query`
/// statements rather than the `query!` macro, so the schema can be brought
/// up without a pre-existing database to check against.
pub async fn initialize_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS check_infos (
            id BIGSERIAL PRIMARY KEY,
            check_type SMALLINT NOT NULL,
            block_number BIGINT NOT NULL,
            block_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            UNIQUE (check_type)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS register_cota_kv_pairs (
            id BIGSERIAL PRIMARY KEY,
            block_number BIGINT NOT NULL,
            lock_hash TEXT NOT NULL,
            lock_hash_crc BIGINT NOT NULL,
            UNIQUE (lock_hash)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS hold_cota_nft_kv_pairs (
            id BIGSERIAL PRIMARY KEY,
            block_number BIGINT NOT NULL,
            cota_id TEXT NOT NULL,
            cota_id_crc BIGINT NOT NULL,
            token_index BIGINT NOT NULL,
            state SMALLINT NOT NULL,
            configure SMALLINT NOT NULL,
            characteristic TEXT NOT NULL,
            lock_hash TEXT NOT NULL,
            lock_hash_crc BIGINT NOT NULL,
            UNIQUE (cota_id, token_index)
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS hold_cota_nft_kv_pair_versions (
            id BIGSERIAL PRIMARY KEY,
            old_block_number BIGINT NOT NULL,
            block_number BIGINT NOT NULL,
            cota_id TEXT NOT NULL,
            token_index BIGINT NOT NULL,
            old_state SMALLINT,
            state SMALLINT NOT NULL,
            configure SMALLINT NOT NULL,
            old_characteristic TEXT,
            characteristic TEXT NOT NULL,
            old_lock_hash TEXT,
            lock_hash TEXT NOT NULL,
            action_type SMALLINT NOT NULL,
            tx_index BIGINT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS scripts (
            id BIGSERIAL PRIMARY KEY,
            code_hash TEXT NOT NULL,
            code_hash_crc BIGINT NOT NULL,
            hash_type TEXT NOT NULL,
            args TEXT NOT NULL,
            args_crc BIGINT NOT NULL,
            UNIQUE (code_hash, hash_type, args)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS withdraw_cota_nft_kv_pairs (
            id BIGSERIAL PRIMARY KEY,
            block_number BIGINT NOT NULL,
            cota_id TEXT NOT NULL,
            cota_id_crc BIGINT NOT NULL,
            token_index BIGINT NOT NULL,
            out_point TEXT NOT NULL,
            out_point_crc BIGINT NOT NULL,
            state SMALLINT NOT NULL,
            configure SMALLINT NOT NULL,
            characteristic TEXT NOT NULL,
            receiver_lock_script_id BIGINT NOT NULL REFERENCES scripts(id),
            lock_hash TEXT NOT NULL,
            lock_hash_crc BIGINT NOT NULL,
            version SMALLINT NOT NULL,
            UNIQUE (cota_id, token_index, out_point)
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS withdraw_cota_nft_kv_pair_versions (
            id BIGSERIAL PRIMARY KEY,
            old_block_number BIGINT NOT NULL,
            block_number BIGINT NOT NULL,
            cota_id TEXT NOT NULL,
            token_index BIGINT NOT NULL,
            out_point TEXT NOT NULL,
            old_state SMALLINT,
            state SMALLINT NOT NULL,
            configure SMALLINT NOT NULL,
            old_characteristic TEXT,
            characteristic TEXT NOT NULL,
            action_type SMALLINT NOT NULL,
            tx_index BIGINT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS claimed_cota_nft_kv_pairs (
            id BIGSERIAL PRIMARY KEY,
            block_number BIGINT NOT NULL,
            cota_id TEXT NOT NULL,
            cota_id_crc BIGINT NOT NULL,
            token_index BIGINT NOT NULL,
            out_point TEXT NOT NULL,
            out_point_crc BIGINT NOT NULL,
            lock_hash TEXT NOT NULL,
            lock_hash_crc BIGINT NOT NULL,
            UNIQUE (cota_id, token_index, lock_hash)
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS claimed_cota_nft_kv_pair_versions (
            id BIGSERIAL PRIMARY KEY,
            old_block_number BIGINT NOT NULL,
            block_number BIGINT NOT NULL,
            cota_id TEXT NOT NULL,
            token_index BIGINT NOT NULL,
            out_point TEXT NOT NULL,
            lock_hash TEXT NOT NULL,
            action_type SMALLINT NOT NULL,
            tx_index BIGINT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS define_cota_nft_kv_pairs (
            id BIGSERIAL PRIMARY KEY,
            block_number BIGINT NOT NULL,
            cota_id TEXT NOT NULL,
            cota_id_crc BIGINT NOT NULL,
            total BIGINT NOT NULL,
            issued BIGINT NOT NULL,
            configure SMALLINT NOT NULL,
            UNIQUE (cota_id)
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS define_cota_nft_kv_pair_versions (
            id BIGSERIAL PRIMARY KEY,
            old_block_number BIGINT NOT NULL,
            block_number BIGINT NOT NULL,
            cota_id TEXT NOT NULL,
            old_total BIGINT,
            total BIGINT NOT NULL,
            old_issued BIGINT,
            issued BIGINT NOT NULL,
            configure SMALLINT NOT NULL,
            action_type SMALLINT NOT NULL,
            tx_index BIGINT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS issuer_infos (
            id BIGSERIAL PRIMARY KEY,
            block_number BIGINT NOT NULL,
            lock_hash TEXT NOT NULL,
            lock_hash_crc BIGINT NOT NULL,
            version TEXT NOT NULL,
            name TEXT NOT NULL,
            avatar TEXT NOT NULL,
            description TEXT NOT NULL,
            localization TEXT NOT NULL,
            UNIQUE (lock_hash)
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS issuer_info_versions (
            id BIGSERIAL PRIMARY KEY,
            old_block_number BIGINT NOT NULL,
            block_number BIGINT NOT NULL,
            lock_hash TEXT NOT NULL,
            old_version TEXT,
            version TEXT NOT NULL,
            old_name TEXT,
            name TEXT NOT NULL,
            old_avatar TEXT,
            avatar TEXT NOT NULL,
            old_description TEXT,
            description TEXT NOT NULL,
            old_localization TEXT,
            localization TEXT NOT NULL,
            action_type SMALLINT NOT NULL,
            tx_index BIGINT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS class_infos (
            id BIGSERIAL PRIMARY KEY,
            block_number BIGINT NOT NULL,
            cota_id TEXT NOT NULL,
            cota_id_crc BIGINT NOT NULL,
            version TEXT NOT NULL,
            name TEXT NOT NULL,
            symbol TEXT NOT NULL,
            description TEXT NOT NULL,
            image TEXT NOT NULL,
            audio TEXT NOT NULL,
            video TEXT NOT NULL,
            model TEXT NOT NULL,
            characteristic TEXT NOT NULL,
            properties TEXT NOT NULL,
            localization TEXT NOT NULL,
            UNIQUE (cota_id)
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS class_info_versions (
            id BIGSERIAL PRIMARY KEY,
            old_block_number BIGINT NOT NULL,
            block_number BIGINT NOT NULL,
            cota_id TEXT NOT NULL,
            old_version TEXT,
            version TEXT NOT NULL,
            old_name TEXT,
            name TEXT NOT NULL,
            old_symbol TEXT,
            symbol TEXT NOT NULL,
            old_description TEXT,
            description TEXT NOT NULL,
            old_characteristic TEXT,
            characteristic TEXT NOT NULL,
            old_properties TEXT,
            properties TEXT NOT NULL,
            old_localization TEXT,
            localization TEXT NOT NULL,
            action_type SMALLINT NOT NULL,
            tx_index BIGINT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS invalid_data (
            id BIGSERIAL PRIMARY KEY,
            block_number BIGINT NOT NULL,
            tx_index BIGINT NOT NULL,
            reason TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_hold_lock_hash_crc ON hold_cota_nft_kv_pairs(lock_hash_crc)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_withdraw_lock_hash_crc ON withdraw_cota_nft_kv_pairs(lock_hash_crc)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_claimed_lock_hash_crc ON claimed_cota_nft_kv_pairs(lock_hash_crc)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
