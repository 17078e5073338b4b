//! Integration tests for resolving product specifications to catalog files

use data_catalog_downloader::catalog::{CatalogResolver, WeekdayCalendar};
use data_catalog_downloader::fetcher::CatalogError;
use data_catalog_downloader::{
    DataType, OptionStyle, ProductSpecification, RemoteFileDescriptor, Resolution, SecurityType,
};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::support::{date, FakeCatalog, FixedCalendar};

fn spy_chains() -> ProductSpecification {
    ProductSpecification::new(
        SecurityType::EquityOption,
        DataType::Chains,
        "usa",
        "SPY",
        Resolution::Minute,
    )
}

#[tokio::test]
async fn test_chains_use_calendar_without_listing() {
    let catalog = Arc::new(FakeCatalog::new());
    let calendar = Arc::new(FixedCalendar(vec![
        date(2021, 1, 4),
        date(2021, 1, 5),
        date(2021, 1, 6),
    ]));
    let resolver = CatalogResolver::with_embedded_registry(catalog.clone(), calendar).unwrap();
    let spec = spy_chains().with_date_range(Some(date(2021, 1, 4)), Some(date(2021, 1, 6)));

    let files = resolver.build_file_list(&spec, Decimal::ZERO).await.unwrap();

    assert_eq!(
        files,
        vec![
            RemoteFileDescriptor::new("option/usa/chains/20210104/spy.csv", Decimal::ZERO),
            RemoteFileDescriptor::new("option/usa/chains/20210105/spy.csv", Decimal::ZERO),
            RemoteFileDescriptor::new("option/usa/chains/20210106/spy.csv", Decimal::ZERO),
        ]
    );
    assert!(resolver.probe_exists(&spec).await.unwrap());
    assert_eq!(catalog.list_calls(), 0);
}

#[tokio::test]
async fn test_chains_on_weekday_calendar_skip_weekend() {
    let catalog = Arc::new(FakeCatalog::new());
    let resolver =
        CatalogResolver::with_embedded_registry(catalog, Arc::new(WeekdayCalendar::new())).unwrap();
    // Friday to Monday
    let spec = spy_chains().with_date_range(Some(date(2021, 1, 8)), Some(date(2021, 1, 11)));

    let dates = resolver.resolve_dates(&spec).await.unwrap();

    assert_eq!(dates, vec![date(2021, 1, 8), date(2021, 1, 11)]);
}

#[tokio::test]
async fn test_chains_without_bounds_are_invalid() {
    let catalog = Arc::new(FakeCatalog::new());
    let resolver =
        CatalogResolver::with_embedded_registry(catalog, Arc::new(WeekdayCalendar::new())).unwrap();
    let spec = spy_chains().with_date_range(Some(date(2021, 1, 4)), None);

    let result = resolver.build_file_list(&spec, Decimal::ZERO).await;

    assert!(matches!(result, Err(CatalogError::InvalidSpecification(_))));
}

#[tokio::test]
async fn test_ticker_dated_resolution_is_ascending_within_bounds() {
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_file("indexoption/usa/minute/spx/20210108_quote_european.zip", b"")
            .with_file("indexoption/usa/minute/spx/20210104_quote_european.zip", b"")
            .with_file("indexoption/usa/minute/spx/20210105_quote_european.zip", b"")
            .with_file("indexoption/usa/minute/spx/20210105_trade_european.zip", b"")
            .with_file("indexoption/usa/minute/spxw/20210106_quote_european.zip", b""),
    );
    let resolver =
        CatalogResolver::with_embedded_registry(catalog.clone(), Arc::new(WeekdayCalendar::new()))
            .unwrap();
    let spec = ProductSpecification::new(
        SecurityType::IndexOption,
        DataType::Quote,
        "USA",
        "SPX",
        Resolution::Minute,
    )
    .with_option_style(OptionStyle::European)
    .with_date_range(Some(date(2021, 1, 1)), Some(date(2021, 1, 7)));

    let dates = resolver.resolve_dates(&spec).await.unwrap();
    assert_eq!(dates, vec![date(2021, 1, 4), date(2021, 1, 5)]);

    let all = resolver.available_dates(&spec).await.unwrap().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(catalog.list_calls(), 2);
}

#[tokio::test]
async fn test_unknown_ticker_probe_is_false() {
    let catalog = Arc::new(
        FakeCatalog::new().with_file("equity/usa/minute/spy/20210104_trade.zip", b""),
    );
    let resolver =
        CatalogResolver::with_embedded_registry(catalog, Arc::new(WeekdayCalendar::new())).unwrap();

    let spy = ProductSpecification::new(
        SecurityType::Equity,
        DataType::Trade,
        "usa",
        "SPY",
        Resolution::Minute,
    );
    let qqq = ProductSpecification::new(
        SecurityType::Equity,
        DataType::Trade,
        "usa",
        "QQQ",
        Resolution::Minute,
    );

    assert!(resolver.probe_exists(&spy).await.unwrap());
    assert!(!resolver.probe_exists(&qqq).await.unwrap());
}

#[tokio::test]
async fn test_option_without_style_is_invalid() {
    let catalog = Arc::new(FakeCatalog::new());
    let resolver =
        CatalogResolver::with_embedded_registry(catalog, Arc::new(WeekdayCalendar::new())).unwrap();
    let spec = ProductSpecification::new(
        SecurityType::EquityOption,
        DataType::Trade,
        "usa",
        "AAPL",
        Resolution::Minute,
    );

    assert!(matches!(
        resolver.build_file_list(&spec, Decimal::ONE).await,
        Err(CatalogError::InvalidSpecification(_))
    ));
}
