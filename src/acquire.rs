//! The fixed acquisition sequence and the end-to-end run.

use log::{debug, info, warn};

use crate::block::WaveformBuffer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::export;
use crate::identity::Identity;
use crate::scpi::Instrument;
use crate::session::{Session, Vxi11Session};
use crate::waveform::{self, Preamble};

pub const IDN: &str = "*IDN?";
pub const AUTOSCALE: &str = ":autoscale";

/// Setup commands, sent verbatim and in this order.
pub const SETUP: [&str; 4] = [
    ":waveform:points:mode raw",
    ":waveform:points 10240",
    ":waveform:source channel2",
    ":waveform:format byte",
];

pub const PREAMBLE_QUERY: &str = ":WAVeform:PREamble?";
pub const DATA_QUERY: &str = ":waveform:data?";

/// Result of one acquisition; the payload itself stays in the caller's buffer.
#[derive(Debug)]
pub struct Acquisition {
    pub idn: String,
    pub preamble: Preamble,
    pub len: usize,
    pub truncated: bool,
}

/// Clears the instrument and runs the setup and transfer sequence, stopping at the first failure.
pub fn acquire<S: Session>(inst: &mut Instrument<S>, buf: &mut WaveformBuffer) -> Result<Acquisition> {
    inst.session().clear().map_err(|source| Error::Send {
        command: "device clear".to_owned(),
        source,
    })?;

    let idn = inst.query_text(IDN)?;
    match Identity::parse(&idn) {
        Some(identity) => {
            info!("Connected instrument: {} {}", identity.manufacturer, identity.model);
            debug!("{}", serde_json::to_string(&identity).unwrap_or_default());
        }
        None => info!("Connected instrument: {}", idn),
    }

    inst.send_command(AUTOSCALE)?;

    info!("Performing setup.");
    for command in SETUP.iter() {
        inst.send_command(command)?;
    }

    let values = inst.query_numbers(PREAMBLE_QUERY)?;
    let preamble = Preamble::from_values(&values)?;
    debug!("Preamble: {}", serde_json::to_string(&preamble).unwrap_or_default());

    info!("Requesting data.");
    let block = inst.query_block(DATA_QUERY, buf)?;
    info!("Bytes transferred: {}", block.len);
    if !block.truncated && block.len as f64 != preamble.points() {
        warn!("Instrument announced {} points but sent {}", preamble.points(), block.len);
    }

    Ok(Acquisition {
        idn,
        preamble,
        len: block.len,
        truncated: block.truncated,
    })
}

fn acquire_and_write<S: Session>(inst: &mut Instrument<S>, config: &Config) -> Result<usize> {
    inst.session()
        .set_timeout(config.timeout())
        .map_err(Error::Config)?;

    let mut buf = WaveformBuffer::default();
    let acquisition = acquire(inst, &mut buf)?;

    info!("Writing data to disk.");
    let samples = waveform::convert(&acquisition.preamble, buf.as_slice());
    export::write_file(&config.output, &samples)?;
    Ok(samples.len())
}

/// Acquires, converts and writes, closing the session on every path. Returns the number of samples written.
pub fn run_with<S: Session>(inst: &mut Instrument<S>, config: &Config) -> Result<usize> {
    let result = acquire_and_write(inst, config);

    if let Err(e) = inst.session().close() {
        warn!("Failed to close session: {}", e);
    }
    result
}

pub fn run(config: &Config) -> Result<usize> {
    let session = Vxi11Session::open(&config.address, config.timeout())?;
    let mut inst = Instrument::new(session, config.settle_delay());
    run_with(&mut inst, config)
}
