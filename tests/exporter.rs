mod resource {
    pub mod customer;
    pub mod memory;
}

#[cfg(test)]
mod tests {
    use crate::resource::{
        customer::{Country, Customer, Level},
        memory::MemorySink,
    };
    use indoc::indoc;
    use sluice::{
        ExportOptions, RecordParser, Separator, TABLE_ORDERING_FILE, export_entities, save,
        save_all,
    };
    use std::fs;
    use time::macros::datetime;

    fn countries() -> Vec<Country> {
        vec![
            Country {
                id: 1,
                create_date: Some(datetime!(2013-07-14 00:03:51)),
                create_by: None,
                name: "China".into(),
                native_name: Some("中国".into()),
                separator: Some(",".into()),
                note: None,
            },
            Country {
                id: 2,
                name: "Côte d'Ivoire".into(),
                note: Some("said \"hello\"\nand left".into()),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn export_with_header() {
        let mut out = Vec::new();
        let written = export_entities(&countries(), &mut out, Separator::Csv).unwrap();
        assert_eq!(written, 2);
        let expected = indoc! {r#"
            id,create_date,create_by,name,native_name,separator,note
            1,2013-07-14 00:03:51,null,China,中国,",",null
            2,null,null,Côte d'Ivoire,null,null,"said ""hello""
            and left"
        "#}
        .replace('\n', "\r\n");
        // The embedded line break of the last record stays a bare `\n`.
        let expected = expected.replace("\"\"hello\"\"\r\n", "\"\"hello\"\"\n");
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn export_then_parse() {
        let countries = countries();
        let mut out = Vec::new();
        export_entities(&countries, &mut out, Separator::Tsv).unwrap();
        let parsed = RecordParser::<Country, _>::builder()
            .separator(Separator::Tsv)
            .skip(1)
            .build(out.as_slice())
            .unwrap()
            .collect::<sluice::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(parsed, countries);
    }

    #[test]
    fn export_nested() {
        let mut customer = Customer {
            name: "Ada".into(),
            level: Level::Gold,
            ad_position: Some(2),
            ..Default::default()
        };
        customer.party.id = 5;
        customer.party.audit.created_by = Some("system".into());
        let mut out = Vec::new();
        export_entities([&customer], &mut out, Separator::Csv).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,created_by,created_at,name,level,country_id,ad_position\r\n\
             5,system,null,Ada,Gold,null,2\r\n"
        );
    }

    #[test]
    fn save_statements() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("country.csv");
        let options = ExportOptions::builder()
            .path(&path)
            .table("country")
            .build()
            .unwrap();

        let (mut sink, journal) = MemorySink::<Country>::new("jdbc:mysql://localhost/geo");
        sink.connection.columns = vec!["id".into(), "name".into()];
        sink.on_execute = Box::new(|_| Ok(3));
        assert_eq!(save(sink, &options).unwrap(), 3);
        {
            let journal = journal.borrow();
            let statement = &journal.statements[0];
            assert!(
                statement.starts_with("SELECT 'id','name' UNION ALL SELECT id,name FROM country INTO OUTFILE '"),
                "{statement}"
            );
            assert_eq!(journal.commits, 1);
            assert_eq!(journal.closed, 1);
        }

        let (mut sink, journal) = MemorySink::<Country>::new("H2 2.2.224");
        sink.connection.columns = vec!["id".into(), "name".into()];
        save(sink, &options).unwrap();
        let journal = journal.borrow();
        assert!(journal.statements[0].starts_with("CALL CSVWRITE('"));
        assert!(
            journal.statements[0].ends_with("', 'SELECT id,name FROM country', 'charset=UTF-8')")
        );
    }

    #[test]
    fn save_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TABLE_ORDERING_FILE), "country\n\ncustomer\n").unwrap();
        let (mut sink, journal) = MemorySink::<Country>::new("jdbc:h2:mem:test");
        sink.connection.columns = vec!["id".into()];
        save_all(sink, dir.path()).unwrap();
        let journal = journal.borrow();
        assert_eq!(journal.statements.len(), 2);
        assert!(journal.statements[0].contains("country.csv"));
        assert!(journal.statements[1].contains("FROM customer"));
    }

    #[test]
    fn failed_save_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions::builder()
            .path(dir.path().join("country.csv"))
            .table("country")
            .build()
            .unwrap();
        let (mut sink, journal) = MemorySink::<Country>::new("jdbc:h2:mem:test");
        sink.on_execute = Box::new(|_| Err(sluice::Error::msg("Disk full")));
        assert!(save(sink, &options).is_err());
        let journal = journal.borrow();
        assert_eq!(journal.rollbacks, 1);
        assert_eq!(journal.closed, 1);
    }
}
