diesel::table! {
    uuid_map (id) {
        id -> Bigint,
        player_uuid -> Varchar,
        player_nick -> Varchar,
        player_last_online -> Datetime,
    }
}

diesel::table! {
    hall_of_fame (player_id) {
        player_id -> Bigint,
        score -> Bigint,
    }
}

diesel::table! {
    sync_metadata (last_update) {
        last_update -> Datetime,
        server_name -> Nullable<Varchar>,
        server_desc -> Nullable<Varchar>,
        server_url -> Nullable<Varchar>,
        server_icon -> Nullable<Blob>,
    }
}

diesel::table! {
    broken (player_id, stat_name) {
        player_id -> Bigint,
        stat_name -> Varchar,
        amount -> Bigint,
        position -> Nullable<Bigint>,
    }
}

diesel::table! {
    crafted (player_id, stat_name) {
        player_id -> Bigint,
        stat_name -> Varchar,
        amount -> Bigint,
        position -> Nullable<Bigint>,
    }
}

diesel::table! {
    custom (player_id, stat_name) {
        player_id -> Bigint,
        stat_name -> Varchar,
        amount -> Bigint,
        position -> Nullable<Bigint>,
    }
}

diesel::table! {
    dropped (player_id, stat_name) {
        player_id -> Bigint,
        stat_name -> Varchar,
        amount -> Bigint,
        position -> Nullable<Bigint>,
    }
}

diesel::table! {
    killed (player_id, stat_name) {
        player_id -> Bigint,
        stat_name -> Varchar,
        amount -> Bigint,
        position -> Nullable<Bigint>,
    }
}

diesel::table! {
    killed_by (player_id, stat_name) {
        player_id -> Bigint,
        stat_name -> Varchar,
        amount -> Bigint,
        position -> Nullable<Bigint>,
    }
}

diesel::table! {
    mined (player_id, stat_name) {
        player_id -> Bigint,
        stat_name -> Varchar,
        amount -> Bigint,
        position -> Nullable<Bigint>,
    }
}

diesel::table! {
    picked_up (player_id, stat_name) {
        player_id -> Bigint,
        stat_name -> Varchar,
        amount -> Bigint,
        position -> Nullable<Bigint>,
    }
}

diesel::table! {
    used (player_id, stat_name) {
        player_id -> Bigint,
        stat_name -> Varchar,
        amount -> Bigint,
        position -> Nullable<Bigint>,
    }
}

diesel::joinable!(hall_of_fame -> uuid_map (player_id));
diesel::joinable!(broken -> uuid_map (player_id));
diesel::joinable!(crafted -> uuid_map (player_id));
diesel::joinable!(custom -> uuid_map (player_id));
diesel::joinable!(dropped -> uuid_map (player_id));
diesel::joinable!(killed -> uuid_map (player_id));
diesel::joinable!(killed_by -> uuid_map (player_id));
diesel::joinable!(mined -> uuid_map (player_id));
diesel::joinable!(picked_up -> uuid_map (player_id));
diesel::joinable!(used -> uuid_map (player_id));

diesel::allow_tables_to_appear_in_same_query!(
    uuid_map,
    hall_of_fame,
    sync_metadata,
    broken,
    crafted,
    custom,
    dropped,
    killed,
    killed_by,
    mined,
    picked_up,
    used,
);
