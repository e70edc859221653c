use shared::domain::{
    AppKind, Application, Business, ChainId, Environment, Location, LocationId, PhysicalAddress,
};

struct BusinessRow {
    row_number: u32,
    sales_org: (&'static str, &'static str),
    sales_channel: (&'static str, &'static str),
    partner: (&'static str, &'static str),
    partner_group: &'static str,
    super_chain: (&'static str, &'static str),
    chain_id: &'static str,
    chain_entity_id: &'static str,
    chain_name: &'static str,
    legal_name: &'static str,
    federal_tax_id: &'static str,
    address: (&'static str, &'static str, &'static str, &'static str, &'static str),
}

const BUSINESSES: &[BusinessRow] = &[
    BusinessRow {
        row_number: 1,
        sales_org: ("GLXCO", "Galaxy Corp"),
        sales_channel: ("GLXWEB", "Galaxy Web Sales"),
        partner: ("PARGLX1", "Galaxy Corp"),
        partner_group: "GLXGRP2025001",
        super_chain: ("S000001234", "ORION'S BELT BISTROS"),
        chain_id: "OBB555",
        chain_entity_id: "987654321",
        chain_name: "Orion's Belt Cafe",
        legal_name: "ORION'S BELT BISTROS LLC",
        federal_tax_id: "123456789",
        address: ("123 Starburst Lane", "Cosmos", "CA", "90210", "1111"),
    },
    BusinessRow {
        row_number: 2,
        sales_org: ("SUNFL", "Sunflower Foods"),
        sales_channel: ("SUNFLRET", "Sunflower Retail"),
        partner: ("PARSUN1", "Sunflower Foods"),
        partner_group: "SUNGRP2025002",
        super_chain: ("S000005678", "GARDEN FRESH MARKETS"),
        chain_id: "GFM888",
        chain_entity_id: "876543210",
        chain_name: "Garden Fresh Grocers",
        legal_name: "GARDEN FRESH MARKETS INC",
        federal_tax_id: "987654321",
        address: ("456 Meadowbrook Dr", "Springfield", "IL", "62704", "2222"),
    },
    BusinessRow {
        row_number: 3,
        sales_org: ("AQUATEC", "AquaTech Solutions"),
        sales_channel: ("AQUAB2B", "AquaTech B2B"),
        partner: ("PARAQUA1", "AquaTech Solutions"),
        partner_group: "AQUAGRP2025003",
        super_chain: ("S000009101", "OCEANIC GEAR SUPPLY"),
        chain_id: "OGS999",
        chain_entity_id: "765432109",
        chain_name: "Oceanic Dive Shop",
        legal_name: "OCEANIC GEAR SUPPLY CO",
        federal_tax_id: "555444333",
        address: ("789 Coral Reef Rd", "Key West", "FL", "33040", "3333"),
    },
];

// (chain, id, name, address, city, state, postal, phone, email, active)
type LocationRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    bool,
);

#[rustfmt::skip]
const LOCATIONS: &[LocationRow] = &[
    ("OBB555", "LOC001", "Orion's Belt Cafe - Downtown", "123 Starburst Lane", "Cosmos", "CA", "90210", "(555) 123-4567", "downtown@orionsbelt.com", true),
    ("OBB555", "LOC002", "Orion's Belt Cafe - Uptown", "456 Galaxy Blvd", "Cosmos", "CA", "90211", "(555) 123-4568", "uptown@orionsbelt.com", true),
    ("OBB555", "LOC003", "Orion's Belt Cafe - Airport", "789 Terminal Way", "Cosmos", "CA", "90212", "(555) 123-4569", "airport@orionsbelt.com", false),
    ("GFM888", "LOC004", "Garden Fresh Grocers - Main Store", "456 Meadowbrook Dr", "Springfield", "IL", "62704", "(555) 234-5678", "main@gardenfresh.com", true),
    ("GFM888", "LOC005", "Garden Fresh Grocers - Westside", "789 Green Valley Rd", "Springfield", "IL", "62705", "(555) 234-5679", "westside@gardenfresh.com", true),
    ("OGS999", "LOC006", "Oceanic Dive Shop - Key West", "789 Coral Reef Rd", "Key West", "FL", "33040", "(555) 345-6789", "keywest@oceanicgear.com", true),
    ("OGS999", "LOC007", "Oceanic Dive Shop - Miami", "321 Ocean Drive", "Miami", "FL", "33101", "(555) 345-6790", "miami@oceanicgear.com", true),
    ("OGS999", "LOC008", "Oceanic Dive Shop - Tampa", "654 Gulf Blvd", "Tampa", "FL", "33602", "(555) 345-6791", "tampa@oceanicgear.com", true),
];

#[rustfmt::skip]
const APPLICATIONS: &[(&str, &str, AppKind, Environment)] = &[
    ("Phoenix UI", "https://phoenix.example.dev", AppKind::Ui, Environment::Dev),
    ("Auth Service", "https://auth-api.example.dev", AppKind::Backend, Environment::Dev),
    ("User Profile UI", "https://profile.example.qa", AppKind::Ui, Environment::Qa),
    ("Search API", "https://search-api.example.qa", AppKind::Backend, Environment::Qa),
    ("Admin Portal", "https://admin.example.stage", AppKind::Ui, Environment::Stage),
    ("Notification Service", "https://notifications.example.stage", AppKind::Backend, Environment::Stage),
    ("Checkout UI", "https://checkout.example.prod", AppKind::Ui, Environment::Prod),
    ("Payments API", "https://payments.example.prod", AppKind::Backend, Environment::Prod),
];

pub(crate) fn businesses() -> Vec<Business> {
    BUSINESSES
        .iter()
        .map(|row| {
            let (line1, city, state, postal_code, extension) = row.address;
            Business {
                row_number: row.row_number,
                sales_organization_code: row.sales_org.0.into(),
                sales_organization_name: row.sales_org.1.into(),
                sales_channel_code: row.sales_channel.0.into(),
                sales_channel_name: row.sales_channel.1.into(),
                partner_id: row.partner.0.into(),
                partner_name: row.partner.1.into(),
                partner_group_id: row.partner_group.into(),
                partner_group_name: row.partner_group.into(),
                super_chain_id: row.super_chain.0.into(),
                super_chain_name: row.super_chain.1.into(),
                chain_id: ChainId::new(row.chain_id),
                chain_entity_id: row.chain_entity_id.into(),
                chain_name: row.chain_name.into(),
                dba_name: row.chain_name.into(),
                legal_name: row.legal_name.into(),
                federal_tax_id: row.federal_tax_id.into(),
                physical_address: PhysicalAddress {
                    address_type: "Physical Address".into(),
                    address_line1: line1.into(),
                    city: city.into(),
                    state: state.into(),
                    postal_code: postal_code.into(),
                    postal_code_extension: extension.into(),
                    country: "01".into(),
                },
            }
        })
        .collect()
}

pub(crate) fn locations_for(chain_id: &ChainId) -> Vec<Location> {
    LOCATIONS
        .iter()
        .filter(|row| row.0 == chain_id.as_str())
        .map(
            |&(chain, id, name, address, city, state, postal_code, phone, email, is_active)| {
                Location {
                    id: LocationId::new(id),
                    chain_id: ChainId::new(chain),
                    name: name.into(),
                    address: address.into(),
                    city: city.into(),
                    state: state.into(),
                    postal_code: postal_code.into(),
                    phone: Some(phone.into()),
                    email: Some(email.into()),
                    is_active,
                }
            },
        )
        .collect()
}

pub(crate) fn applications() -> Vec<Application> {
    APPLICATIONS
        .iter()
        .map(|&(name, url, kind, environment)| Application {
            name: name.into(),
            url: url.into(),
            kind,
            source_code_url: "#".into(),
            ci_url: "#".into(),
            environment,
        })
        .collect()
}
