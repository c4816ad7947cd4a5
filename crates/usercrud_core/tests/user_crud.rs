use rusqlite::Connection;
use usercrud_core::db::migrations::latest_version;
use usercrud_core::db::open_db_in_memory;
use usercrud_core::{
    RepoError, SqliteUserRepository, User, UserListQuery, UserLookup, UserRepository, UserService,
};

#[test]
fn insert_and_fetch_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let user = User::new("Milan Parajuli", 41, "Palpa", "Male");
    repo.insert_user(&user).unwrap();

    let loaded = repo.get_user_by_name("Milan Parajuli").unwrap().unwrap();
    assert_eq!(loaded, user);
}

#[test]
fn fetch_missing_name_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    assert!(repo.get_user_by_name("nobody").unwrap().is_none());
}

#[test]
fn fetch_is_exact_match_on_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    repo.insert_user(&User::new("Milan", 41, "Palpa", "Male")).unwrap();

    assert!(repo.get_user_by_name("milan").unwrap().is_none());
    assert!(repo.get_user_by_name("Milan ").unwrap().is_none());
}

#[test]
fn update_missing_name_returns_not_found_and_leaves_store_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let existing = User::new("Sita", 30, "Kathmandu", "Female");
    repo.insert_user(&existing).unwrap();

    let err = repo
        .update_user(&User::new("Ghost", 1, "Nowhere", "Male"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(name) if name == "Ghost"));

    let all = repo.list_users(&UserListQuery::default()).unwrap();
    assert_eq!(all, vec![existing]);
}

#[test]
fn delete_missing_name_returns_not_found_and_leaves_store_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let existing = User::new("Sita", 30, "Kathmandu", "Female");
    repo.insert_user(&existing).unwrap();

    let err = repo.delete_user("Ghost").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(name) if name == "Ghost"));

    let all = repo.list_users(&UserListQuery::default()).unwrap();
    assert_eq!(all, vec![existing]);
}

#[test]
fn update_leaves_rows_with_other_names_untouched() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let bystander = User::new("Sita", 30, "Kathmandu", "Female");
    repo.insert_user(&User::new("Milan", 41, "Palpa", "Male")).unwrap();
    repo.insert_user(&bystander).unwrap();

    let changed = repo
        .update_user(&User::new("Milan", 42, "Dang", "Female"))
        .unwrap();
    assert_eq!(changed, 1);

    let milan = repo.get_user_by_name("Milan").unwrap().unwrap();
    assert_eq!(milan, User::new("Milan", 42, "Dang", "Female"));
    assert_eq!(repo.get_user_by_name("Sita").unwrap().unwrap(), bystander);
}

#[test]
fn delete_then_fetch_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    repo.insert_user(&User::new("Milan", 41, "Palpa", "Male")).unwrap();

    assert_eq!(repo.delete_user("Milan").unwrap(), 1);
    assert!(repo.get_user_by_name("Milan").unwrap().is_none());
}

#[test]
fn duplicate_names_make_fetch_ambiguous_and_writes_apply_to_all() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    repo.insert_user(&User::new("Ram", 20, "Pokhara", "Male")).unwrap();
    repo.insert_user(&User::new("Ram", 55, "Butwal", "Male")).unwrap();

    let err = repo.get_user_by_name("Ram").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Ambiguous { ref name, matches: 2 } if name == "Ram"
    ));

    let changed = repo
        .update_user(&User::new("Ram", 60, "Dang", "Male"))
        .unwrap();
    assert_eq!(changed, 2);
    let query = UserListQuery {
        name: Some("Ram".to_string()),
        ..UserListQuery::default()
    };
    let rows = repo.list_users(&query).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|user| user.age == 60 && user.address == "Dang"));

    assert_eq!(repo.delete_user("Ram").unwrap(), 2);
    assert!(repo.list_users(&query).unwrap().is_empty());
}

#[test]
fn list_orders_by_name_then_insertion_and_pages() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    repo.insert_user(&User::new("c", 3, "x", "y")).unwrap();
    repo.insert_user(&User::new("a", 1, "x", "y")).unwrap();
    repo.insert_user(&User::new("b", 2, "first", "y")).unwrap();
    repo.insert_user(&User::new("b", 2, "second", "y")).unwrap();

    let names: Vec<String> = repo
        .list_users(&UserListQuery::default())
        .unwrap()
        .into_iter()
        .map(|user| user.name)
        .collect();
    assert_eq!(names, ["a", "b", "b", "c"]);

    let page = repo
        .list_users(&UserListQuery {
            limit: Some(2),
            offset: 1,
            ..UserListQuery::default()
        })
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].address, "first");
    assert_eq!(page[1].address, "second");

    let tail = repo
        .list_users(&UserListQuery {
            offset: 3,
            ..UserListQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].name, "c");
}

#[test]
fn fetch_reports_invalid_persisted_age() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    conn.execute(
        "INSERT INTO users (name, age, address, gender) VALUES ('Old', -5, 'x', 'y');",
        [],
    )
    .unwrap();

    let err = repo.get_user_by_name("Old").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn duplicate_names_are_ambiguous_even_when_first_row_is_malformed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    conn.execute_batch(
        "INSERT INTO users (name, age, address, gender) VALUES ('Ram', -1, 'x', 'y');
         INSERT INTO users (name, age, address, gender) VALUES ('Ram', 3, 'x', 'y');",
    )
    .unwrap();

    let err = repo.get_user_by_name("Ram").unwrap_err();
    assert!(matches!(err, RepoError::Ambiguous { matches: 2, .. }));
}

#[test]
fn fetch_reports_wrongly_typed_age_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    conn.execute(
        "INSERT INTO users (name, age, address, gender) VALUES ('T', 'forty', 'x', 'y');",
        [],
    )
    .unwrap();

    let err = repo.get_user_by_name("T").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("users.age")));
}

#[test]
fn service_reports_malformed_row_as_unavailable() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());
    conn.execute(
        "INSERT INTO users (name, age, address, gender) VALUES ('T', 41, X'FF', 'y');",
        [],
    )
    .unwrap();

    assert_eq!(service.fetch_by_name("T"), UserLookup::Unavailable);
}

#[test]
fn milan_parajuli_scenario_through_service() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());

    assert!(service.insert(&User::new("Milan Parajuli", 41, "Palpa", "Male")));
    assert_eq!(
        service.fetch_by_name("Milan Parajuli"),
        UserLookup::Found(User::new("Milan Parajuli", 41, "Palpa", "Male"))
    );

    assert!(service.update(&User::new("Milan Parajuli", 41, "Dang", "Female")));
    assert_eq!(
        service.fetch_by_name("Milan Parajuli"),
        UserLookup::Found(User::new("Milan Parajuli", 41, "Dang", "Female"))
    );

    assert!(service.delete("Milan Parajuli"));
    assert_eq!(service.fetch_by_name("Milan Parajuli"), UserLookup::NotFound);
}

#[test]
fn service_reports_no_match_writes_as_false() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());

    assert!(!service.update(&User::new("Ghost", 1, "x", "y")));
    assert!(!service.delete("Ghost"));
    assert_eq!(service.fetch_by_name("Ghost"), UserLookup::NotFound);
}

#[test]
fn service_reports_duplicates_as_ambiguous() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());
    assert!(service.insert(&User::new("Ram", 20, "Pokhara", "Male")));
    assert!(service.insert(&User::new("Ram", 21, "Pokhara", "Male")));

    assert_eq!(
        service.fetch_by_name("Ram"),
        UserLookup::Ambiguous { matches: 2 }
    );
}

#[test]
fn service_swallows_storage_faults() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());
    conn.execute_batch("DROP TABLE users;").unwrap();

    let user = User::new("Milan Parajuli", 41, "Palpa", "Male");
    assert!(!service.insert(&user));
    assert!(!service.update(&user));
    assert!(!service.delete("Milan Parajuli"));
    assert_eq!(
        service.fetch_by_name("Milan Parajuli"),
        UserLookup::Unavailable
    );
}

#[test]
fn repository_surfaces_storage_faults_as_db_errors() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    conn.execute_batch("DROP TABLE users;").unwrap();

    let err = repo.insert_user(&User::new("Milan", 41, "Palpa", "Male")).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(matches!(repo.get_user_by_name("Milan"), Err(RepoError::Db(_))));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteUserRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_users_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteUserRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("users"))
    ));
}

#[test]
fn repository_rejects_users_table_missing_a_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE users (name TEXT, age INTEGER, address TEXT);")
        .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteUserRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "users",
            column: "gender"
        })
    ));
}
