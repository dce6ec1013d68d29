use minisql::*;

fn main() -> Result<()> {
    println!("minisql demo\n");

    let path = std::env::temp_dir().join("minisql_demo.db");
    let _ = std::fs::remove_file(&path);

    // Create a file-backed database
    let mut db = Database::open(&path)?;

    db.create_table(
        "users".into(),
        vec![
            ColumnDef::new("id", DataType::Integer),
            ColumnDef::new("name", DataType::Text),
            ColumnDef::new("age", DataType::Integer),
        ],
    )?;
    println!("Created table 'users'");

    // Insert through the storage API and through statements
    db.insert_row(
        "users",
        vec![Value::Integer(1), Value::Text("Alice".into()), Value::Integer(30)],
    )?;
    db.execute("INSERT INTO users VALUES (2, 'Bob', 25);")?;
    db.execute("INSERT INTO users VALUES (3, 'Charlie', 25);")?;
    println!("Inserted 3 rows\n");

    if let Some(table) = db.get_table("users") {
        print!("{}", table.render());
    }

    let updated = db.update_rows("users", "age", &Value::Integer(26), "name", &Value::Text("Bob".into()))?;
    println!("\nUpdated {updated} rows");

    let deleted = db.delete_rows("users", "age", &Value::Integer(25))?;
    println!("Deleted {deleted} rows\n");

    for row in db.select_all("users")? {
        let fields: Vec<String> = row.iter().map(Value::to_string).collect();
        println!("  {}", fields.join(" | "));
    }

    // Save once, then load again
    db.close()?;
    let db = Database::open(&path)?;
    println!("\nTables after reopening:");
    for table_name in db.list_tables() {
        println!("  - {}", table_name);
    }

    Ok(())
}
