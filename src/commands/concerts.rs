use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;

use concert_booking::{
    models::{Availability, CatalogQuery, Concert, DateRange, SortKey, StatusFilter},
    services::{
        booking,
        catalog,
        pricing::{self, format_price},
    },
    AppContext,
};

#[derive(Debug, Args)]
pub struct ConcertsArgs {
    /// Search by name or venue
    #[arg(long)]
    search: Option<String>,
    /// event_date | created_at | name | price | price_desc | seat_available
    #[arg(long, default_value = "event_date")]
    sort: SortKey,
    /// all | active | inactive | cancelled
    #[arg(long, default_value = "all")]
    status: StatusFilter,
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Сколько страниц загрузить подряд
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

pub async fn list(ctx: &AppContext, args: ConcertsArgs) -> Result<()> {
    let date_range = (args.from.is_some() || args.to.is_some()).then_some(DateRange {
        start: args.from,
        end: args.to,
    });
    let query = CatalogQuery {
        search_text: args.search.unwrap_or_default(),
        sort_key: args.sort,
        status: args.status,
        date_range,
        ..CatalogQuery::default()
    };

    let mut controller = ctx.catalog().with_query(query);
    controller.refresh();
    controller.settle().await?;

    for _ in 1..args.pages {
        if !controller.load_more() {
            break;
        }
        controller.settle().await?;
    }

    let now = Utc::now();
    for concert in controller.items() {
        print_concert_line(concert, concert.availability(now));
    }
    println!(
        "Showing {} of {} concerts{}",
        controller.items().len(),
        controller.total_count(),
        if controller.has_next_page() { " (more available)" } else { "" }
    );
    Ok(())
}

fn print_concert_line(concert: &Concert, availability: Availability) {
    let quote = pricing::quote(concert, 1);
    let price = if quote.has_discount() {
        format!(
            "{} (was {}, -{}%)",
            format_price(quote.final_unit_price),
            format_price(quote.unit_price),
            quote.discount_percent
        )
    } else {
        format_price(quote.unit_price)
    };
    println!(
        "#{:<5} {:<32} {:<24} {}  {}  {}/{} seats  [{}]",
        concert.id,
        concert.name,
        concert.venue,
        concert.event_start.format("%Y-%m-%d %H:%M"),
        price,
        concert.available_seats(),
        concert.total_seats,
        availability.label()
    );
}

pub async fn book(ctx: &AppContext, concert_id: i64, tickets: u32) -> Result<()> {
    let token = ctx.session.token();
    let concert = catalog::get_concert(&ctx.api, concert_id, token.as_deref()).await?;

    let availability = concert.availability(Utc::now());
    if availability != Availability::Available {
        bail!("{}: {}", concert.name, availability.label());
    }

    let mut flow = ctx.booking_flow(concert);
    let quote = pricing::quote(flow.concert(), tickets);
    println!("{} at {}", flow.concert().name, flow.concert().venue);
    println!("  Price per ticket: {}", format_price(quote.unit_price));
    if let Some(line) = quote.discount_line() {
        println!("  {}", line);
    }
    println!("  Tickets: {}", tickets);
    println!("  Total: {}", format_price(quote.total_price));

    let confirmation = flow.submit_count(tickets).await?;
    match confirmation.id {
        Some(id) => println!("Booking #{} confirmed", id),
        None => println!("Booking confirmed"),
    }
    Ok(())
}

pub async fn bookings(ctx: &AppContext, page: u32) -> Result<()> {
    let page = match booking::list_bookings(&ctx.api, &ctx.session, page).await {
        Ok(page) => page,
        Err(e) => {
            ctx.notifier.error(e.user_message("Failed to load bookings"));
            return Err(e.into());
        }
    };

    if page.data.is_empty() {
        println!("No bookings found");
        return Ok(());
    }
    for row in &page.data {
        let concert = row
            .concert
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("Concert {}", row.concert_id));
        println!(
            "#{:<5} {:<24} {:<32} {:>3} tickets  {}  {}",
            row.id,
            row.customer(),
            concert,
            row.ticket_count,
            format_price(row.total_price),
            row.status_text
        );
    }
    println!(
        "Page {} of {} ({} bookings), page total {}",
        page.pagination.page,
        page.pagination.total_pages,
        page.pagination.total,
        format_price(booking::page_revenue(&page.data))
    );
    Ok(())
}
