use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use concert_booking::{
    error::ClientError,
    models::{Concert, ConcertForm, ConcertStatus},
    services::pricing::format_price,
    AppContext,
};

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Show one concert
    Show {
        #[arg(long)]
        id: i64,
    },
    /// Create a concert
    Create(ConcertFields),
    /// Update a concert; omitted fields keep their current values
    Update {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        fields: ConcertFields,
    },
    /// Delete a concert
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct ConcertFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<i64>,
    #[arg(long)]
    place: Option<String>,
    #[arg(long)]
    seats: Option<u32>,
    #[arg(long)]
    discount: Option<u32>,
    /// RFC 3339, e.g. 2030-01-01T19:00:00Z
    #[arg(long)]
    start: Option<DateTime<Utc>>,
    #[arg(long)]
    end: Option<DateTime<Utc>>,
    /// active | inactive | cancelled
    #[arg(long, value_parser = parse_status)]
    status: Option<ConcertStatus>,
}

fn parse_status(s: &str) -> Result<ConcertStatus, String> {
    match s {
        "active" => Ok(ConcertStatus::Active),
        "inactive" => Ok(ConcertStatus::Inactive),
        "cancelled" => Ok(ConcertStatus::Cancelled),
        other => Err(format!("unknown status: {}", other)),
    }
}

impl ConcertFields {
    fn apply(self, mut form: ConcertForm) -> ConcertForm {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(price) = self.price {
            form.price = price;
        }
        if let Some(place) = self.place {
            form.place = place;
        }
        if let Some(seats) = self.seats {
            form.seat_count = seats;
        }
        if let Some(discount) = self.discount {
            form.discount = discount;
        }
        if self.start.is_some() {
            form.event_date = self.start;
        }
        if self.end.is_some() {
            form.event_end = self.end;
        }
        if let Some(status) = self.status {
            form.status = status;
        }
        form
    }
}

pub async fn run(ctx: &AppContext, command: AdminCommand) -> Result<()> {
    if !ctx.session.is_admin() {
        bail!("Admin access required");
    }
    let admin = ctx.admin();

    match command {
        AdminCommand::Show { id } => {
            let concert = admin.get_concert(id).await?;
            print_concert(&concert);
        }
        AdminCommand::Create(fields) => {
            let form = fields.apply(ConcertForm::default());
            let concert = admin
                .create_concert(form, Utc::now())
                .await
                .map_err(print_form_errors)?;
            print_concert(&concert);
        }
        AdminCommand::Update { id, fields } => {
            let current = admin.get_concert(id).await?;
            let form = fields.apply(ConcertForm::from(&current));
            let concert = admin
                .update_concert(id, form, Utc::now())
                .await
                .map_err(print_form_errors)?;
            print_concert(&concert);
        }
        AdminCommand::Delete { id } => {
            admin.delete_concert(id).await?;
        }
    }
    Ok(())
}

fn print_form_errors(e: ClientError) -> ClientError {
    if let ClientError::InvalidForm(errors) = &e {
        for (field, message) in errors.iter() {
            println!("  {}: {}", field, message);
        }
    }
    e
}

fn print_concert(concert: &Concert) {
    println!("#{} {}", concert.id, concert.name);
    println!("  {}", concert.description);
    println!("  Venue:    {}", concert.venue);
    println!(
        "  When:     {} - {}",
        concert.event_start.format("%Y-%m-%d %H:%M"),
        concert.event_end.format("%Y-%m-%d %H:%M")
    );
    println!("  Price:    {} (discount {}%)", format_price(concert.unit_price), concert.discount_percent);
    println!("  Seats:    {}/{} booked", concert.booked_seats, concert.total_seats);
    println!("  Status:   {}", concert.status.as_str());
}
