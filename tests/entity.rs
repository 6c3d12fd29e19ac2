mod resource {
    pub mod customer;
}

#[cfg(test)]
mod tests {
    use crate::resource::customer::{Country, Customer, Level, Party, Price};
    use sluice::{AsValue, AttributeKind, Entity, Enumeration, Value};

    #[test]
    fn derived_table() {
        #[derive(Entity, Default)]
        struct SomeEntity {
            a: i8,
            b: Option<String>,
        }
        let def = SomeEntity::entity_def();
        assert_eq!(def.name, "SomeEntity");
        assert_eq!(def.table.name, "some_entity");
        assert_eq!(def.table.schema, "");
        assert_eq!(def.fields.len(), 2);
        assert_eq!(def.fields[0].ident, "a");
        assert!(matches!(def.fields[0].kind, AttributeKind::Scalar(Value::Int8(None))));
        assert!(!def.fields[0].nullable);
        assert!(matches!(def.fields[1].kind, AttributeKind::Scalar(Value::Varchar(None))));
        assert!(def.fields[1].nullable);
    }

    #[test]
    fn customer_descriptor() {
        let def = Customer::entity_def();
        assert_eq!(def.table.name, "customers");
        assert_eq!(def.table.schema, "SALES");
        let idents: Vec<_> = def.fields.iter().map(|v| v.ident).collect();
        assert_eq!(idents, ["party", "name", "level", "country", "ad_position"]);
        assert_eq!(def.fields[4].property, "adPosition");
        assert!(matches!(def.fields[0].kind, AttributeKind::Base(..)));
        let (index, base) = def.base().unwrap();
        assert_eq!(index, 0);
        assert_eq!(base.name, "Party");
        assert_eq!(base.primary_key().unwrap().1.ident, "id");
        assert_eq!(def.fields[3].column_name(), "country_id");
        assert!(matches!(
            def.fields[3].kind,
            AttributeKind::ToOne {
                join_column: Some("country_id"),
                referenced: None,
                ..
            }
        ));
        assert!(def.fields[3].nullable);
        assert!(matches!(
            def.fields[2].kind,
            AttributeKind::Scalar(Value::Enum(None, ["Bronze", "Silver", "Gold"]))
        ));
    }

    #[test]
    fn assign_and_read_paths() {
        let mut customer = Customer::default();
        customer.assign(&[0, 0], Value::Int64(Some(7))).unwrap();
        customer
            .assign(&[0, 1, 0], Value::Varchar(Some("admin".into())))
            .unwrap();
        customer.assign(&[2], Value::Enum(Some(2), Level::SYMBOLS)).unwrap();
        assert_eq!(customer.country, None);
        customer.assign(&[3, 0], Value::Int64(Some(86))).unwrap();
        assert_eq!(customer.party.id, 7);
        assert_eq!(customer.party.audit.created_by.as_deref(), Some("admin"));
        assert_eq!(customer.level, Level::Gold);
        assert_eq!(customer.country.as_ref().map(|v| v.id), Some(86));

        assert_eq!(customer.value_at(&[0, 0]).unwrap(), Value::Int64(Some(7)));
        assert_eq!(
            customer.value_at(&[2]).unwrap(),
            Value::Enum(Some(2), Level::SYMBOLS)
        );
        assert_eq!(customer.value_at(&[3, 0]).unwrap(), Value::Int64(Some(86)));
        assert_eq!(customer.value_at(&[4]).unwrap(), Value::Int32(None));
        customer.country = None;
        assert!(customer.value_at(&[3, 0]).unwrap().is_null());
    }

    #[test]
    fn invalid_paths() {
        let mut country = Country::default();
        assert!(country.assign(&[], Value::Int64(Some(1))).is_err());
        assert!(country.assign(&[9], Value::Int64(Some(1))).is_err());
        assert!(country.assign(&[0, 1], Value::Int64(Some(1))).is_err());
        assert!(country.value_at(&[7]).is_err());
        assert!(
            country
                .assign(&[0], Value::Varchar(Some("one".into())))
                .is_err()
        );
    }

    #[test]
    fn widening_on_assign() {
        let mut party = Party::default();
        party.assign(&[0], Value::Int8(Some(3))).unwrap();
        assert_eq!(party.id, 3);
    }

    #[test]
    fn referenced_key() {
        let mut price = Price::default();
        price
            .assign(&[2, 0], Value::Varchar(Some("EUR".into())))
            .unwrap();
        assert_eq!(price.currency.as_ref().map(|v| v.code.as_str()), Some("EUR"));
    }

    #[test]
    fn enumeration() {
        assert_eq!(Level::SYMBOLS, ["Bronze", "Silver", "Gold"]);
        assert_eq!(Level::Silver.ordinal(), 1);
        assert_eq!(Level::from_ordinal(2), Some(Level::Gold));
        assert_eq!(Level::from_ordinal(3), None);
        assert_eq!(Level::from_symbol("Bronze"), Some(Level::Bronze));
        assert_eq!(Level::Gold.as_value().to_string(), "Gold");
        assert_eq!(
            Level::try_from_value(Value::Varchar(Some("Silver".into()))).unwrap(),
            Level::Silver
        );
        assert!(Level::try_from_value(Value::Int32(Some(1))).is_err());
    }
}
