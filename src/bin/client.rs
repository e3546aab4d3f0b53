use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Point of sale terminal
#[derive(Parser, Debug)]
#[command(name = "till")]
#[command(about = "client cli used by restaurant staffs to take orders and manage the menu", version, long_about = None
)]
struct Cli {
    #[arg(long, global = true, default_value = HOST, help = "Server address")]
    host: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// show the menu
    Menu,
    /// cart related ops
    #[command(arg_required_else_help = true)]
    Cart(CartArgs),
    /// admin portal ops
    #[command(arg_required_else_help = true)]
    Admin(AdminArgs),
}

#[derive(Debug, Args)]
struct CartArgs {
    #[arg(short = 't', long, default_value = "front", help = "Terminal whose cart to operate")]
    terminal: String,
    #[command(subcommand)]
    command: CartCmds,
}

#[derive(Debug, Subcommand)]
enum CartCmds {
    Show,
    #[command(arg_required_else_help = true)]
    Add {
        #[arg(long, help = "Id of menu item to add.", value_name = "MENU_ITEM_ID")]
        item: i32,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=100))]
        qty: u32,
    },
    #[command(arg_required_else_help = true)]
    Set {
        #[arg(long, help = "Id of menu item to change.", value_name = "MENU_ITEM_ID")]
        item: i32,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        qty: u32,
    },
    #[command(arg_required_else_help = true)]
    Remove {
        #[arg(long, help = "Id of menu item to remove.", value_name = "MENU_ITEM_ID")]
        item: i32,
    },
    Finalize,
}

#[derive(Debug, Args)]
struct AdminArgs {
    #[arg(long, help = "Session token from `admin login`, falls back to TILL_TOKEN")]
    token: Option<String>,
    #[command(subcommand)]
    command: AdminCmds,
}

#[derive(Debug, Subcommand)]
enum AdminCmds {
    #[command(arg_required_else_help = true)]
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    #[command(arg_required_else_help = true)]
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, help = "Price, e.g. 100.00")]
        price: String,
    },
    #[command(arg_required_else_help = true)]
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
    },
    #[command(arg_required_else_help = true)]
    Delete {
        #[arg(long)]
        id: String,
    },
    Orders {
        #[arg(long)]
        page: Option<u8>,
        #[arg(long)]
        page_size: Option<u8>,
    },
    #[command(arg_required_else_help = true)]
    Bill {
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        id: i64,
    },
}

const HOST: &str = "http://localhost:8080";

#[derive(Debug, Deserialize)]
struct MenuItem {
    id: i32,
    name: String,
    price: String,
}

#[derive(Debug, Deserialize)]
struct MenuResponse {
    items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
struct MenuChangeResponse {
    message: String,
    items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
struct CartLine {
    menu_item_id: i32,
    name: String,
    price: String,
    quantity: u32,
    subtotal: String,
}

#[derive(Debug, Deserialize)]
struct CartResponse {
    items: Vec<CartLine>,
    total: String,
}

#[derive(Debug, Deserialize)]
struct FinalizeResponse {
    bill_id: i64,
    bill_time: String,
    total_amount: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct OrderEntry {
    order_id: i64,
    bill_id: i64,
    item_name: String,
    item_price: String,
    quantity: i32,
    subtotal: String,
    bill_time: String,
}

#[derive(Debug, Deserialize)]
struct OrdersResponse {
    orders: Vec<OrderEntry>,
}

#[derive(Debug, Deserialize)]
struct BillLine {
    order_id: i64,
    item_name: String,
    item_price: String,
    quantity: i32,
    subtotal: String,
}

#[derive(Debug, Deserialize)]
struct BillResponse {
    bill_id: i64,
    bill_time: String,
    total_amount: String,
    lines: Vec<BillLine>,
    consistent: bool,
}

/// body of a 200, otherwise print what the server said
async fn read_ok<T: DeserializeOwned>(res: Response) -> Result<Option<T>, anyhow::Error> {
    match res.status() {
        StatusCode::OK => Ok(Some(res.json::<T>().await?)),
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => {
            println!("{}", res.text().await?);
            Ok(None)
        }
        unexpected => {
            println!("got unexpected status code, {}, {}", unexpected, res.text().await?);
            Ok(None)
        }
    }
}

fn print_menu(items: &[MenuItem]) {
    println!("{:>4}  {:<24} {:>8}", "ID", "Name", "Price");
    for item in items {
        println!("{:>4}  {:<24} {:>8}", item.id, item.name, item.price);
    }
}

fn print_cart(cart: &CartResponse) {
    println!("{:>4}  {:<24} {:>8} {:>4} {:>10}", "ID", "Item", "Price", "Qty", "Subtotal");
    for line in &cart.items {
        println!(
            "{:>4}  {:<24} {:>8} {:>4} {:>10}",
            line.menu_item_id, line.name, line.price, line.quantity, line.subtotal
        );
    }
    println!("Total: {}", cart.total);
}

fn authorized(req: RequestBuilder, token: &Option<String>) -> Result<RequestBuilder, anyhow::Error> {
    let token = match token.clone().or_else(|| std::env::var("TILL_TOKEN").ok()) {
        Some(token) => token,
        None => bail!("not logged in, run `admin login` and pass --token"),
    };
    Ok(req.bearer_auth(token))
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    let host = args.host.trim_end_matches('/').to_string();
    let client = Client::new();

    match args.command {
        Commands::Menu => {
            let res = client.get(format!("{}/v1/menu", host)).send().await?;
            if let Some(menu) = read_ok::<MenuResponse>(res).await? {
                print_menu(&menu.items);
            }
        }
        Commands::Cart(cart) => {
            let base = format!("{}/v1/cart/{}", host, cart.terminal);
            let res = match cart.command {
                CartCmds::Show => client.get(&base).send().await?,
                CartCmds::Add { item, qty } => {
                    client
                        .post(format!("{}/items", base))
                        .json(&serde_json::json!({ "menu_item_id": item, "quantity": qty }))
                        .send()
                        .await?
                }
                CartCmds::Set { item, qty } => {
                    client
                        .patch(format!("{}/items/{}", base, item))
                        .json(&serde_json::json!({ "quantity": qty }))
                        .send()
                        .await?
                }
                CartCmds::Remove { item } => client.delete(format!("{}/items/{}", base, item)).send().await?,
                CartCmds::Finalize => {
                    let res = client.post(format!("{}/finalize", base)).send().await?;
                    if let Some(receipt) = read_ok::<FinalizeResponse>(res).await? {
                        println!(
                            "Bill #{} finalized successfully at {}! Total: {}",
                            receipt.bill_id, receipt.bill_time, receipt.total_amount
                        );
                    }
                    return Ok(());
                }
            };
            if let Some(cart) = read_ok::<CartResponse>(res).await? {
                print_cart(&cart);
            }
        }
        Commands::Admin(admin) => {
            let base = format!("{}/v1/admin", host);
            match admin.command {
                AdminCmds::Login { username, password } => {
                    let res = client
                        .post(format!("{}/login", base))
                        .json(&serde_json::json!({ "username": username, "password": password }))
                        .send()
                        .await?;
                    if let Some(login) = read_ok::<LoginResponse>(res).await? {
                        println!("logged in as {}", login.username);
                        println!("export TILL_TOKEN={}", login.token);
                    }
                }
                AdminCmds::Logout => {
                    let res = authorized(client.post(format!("{}/logout", base)), &admin.token)?
                        .send()
                        .await?;
                    match res.status() {
                        StatusCode::OK => println!("logged out"),
                        unexpected => println!("got unexpected status code, {}", unexpected),
                    }
                }
                AdminCmds::Add { name, price } => {
                    let res = authorized(client.post(format!("{}/menu", base)), &admin.token)?
                        .json(&serde_json::json!({ "name": name, "price": price }))
                        .send()
                        .await?;
                    if let Some(changed) = read_ok::<MenuChangeResponse>(res).await? {
                        println!("{}", changed.message);
                        print_menu(&changed.items);
                    }
                }
                AdminCmds::Update { id, name, price } => {
                    let res = authorized(client.put(format!("{}/menu/{}", base, id)), &admin.token)?
                        .json(&serde_json::json!({ "name": name, "price": price }))
                        .send()
                        .await?;
                    if let Some(changed) = read_ok::<MenuChangeResponse>(res).await? {
                        println!("{}", changed.message);
                        print_menu(&changed.items);
                    }
                }
                AdminCmds::Delete { id } => {
                    let res = authorized(client.delete(format!("{}/menu/{}", base, id)), &admin.token)?
                        .send()
                        .await?;
                    if let Some(changed) = read_ok::<MenuChangeResponse>(res).await? {
                        println!("{}", changed.message);
                        print_menu(&changed.items);
                    }
                }
                AdminCmds::Orders { page, page_size } => {
                    let mut query = Vec::new();
                    if let Some(page) = page {
                        query.push(("page", page));
                    }
                    if let Some(page_size) = page_size {
                        query.push(("page_size", page_size));
                    }
                    let res = authorized(client.get(format!("{}/orders", base)), &admin.token)?
                        .query(&query)
                        .send()
                        .await?;
                    if let Some(history) = read_ok::<OrdersResponse>(res).await? {
                        println!(
                            "{:>6} {:>6}  {:<20} {:>8} {:>4} {:>10}  {}",
                            "Order", "Bill", "Item", "Price", "Qty", "Subtotal", "Time"
                        );
                        for o in history.orders {
                            println!(
                                "{:>6} {:>6}  {:<20} {:>8} {:>4} {:>10}  {}",
                                o.order_id, o.bill_id, o.item_name, o.item_price, o.quantity, o.subtotal, o.bill_time
                            );
                        }
                    }
                }
                AdminCmds::Bill { id } => {
                    let res = authorized(client.get(format!("{}/bills/{}", base, id)), &admin.token)?
                        .send()
                        .await?;
                    if let Some(bill) = read_ok::<BillResponse>(res).await? {
                        println!("Bill #{} at {}, total {}", bill.bill_id, bill.bill_time, bill.total_amount);
                        for line in &bill.lines {
                            println!(
                                "{:>6}  {:<20} {:>8} x{:<3} {:>10}",
                                line.order_id, line.item_name, line.item_price, line.quantity, line.subtotal
                            );
                        }
                        if !bill.consistent {
                            println!("warning: order lines do not add up to the bill total");
                        }
                    }
                }
            }
        }
    };
    Ok(())
}
