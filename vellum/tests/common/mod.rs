// In-process mock agent for integration tests.
#![allow(dead_code)]
//
// Speaks the real wire protocol over loopback TCP: plaintext handshake,
// sealed exchanges with mirrored direction counters, a toy chain with
// instant canonization, and extended-API routing between connections.

use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use uuid::Uuid;

use vellum::crypto::{
    derive_session_secret, generate_nonce, MessageCipher, CLIENT_IV_INITIAL, SERVER_IV_INITIAL,
};
use vellum::data::{
    decode_submit_payload, BlockRecord, TransactionRecord, FULL_ID, ROOT_BLOCK_ID, ZERO_ID,
};
use vellum::handshake::{HandshakeAck, HandshakeRequest, HandshakeResponse};
use vellum::identity::Identity;
use vellum::verb::Verb;
use vellum::wire::{read_frame, write_frame, RequestHeader, ResponseHeader, STATUS_SUCCESS};

pub const STATUS_NOT_FOUND: u32 = 8;
pub const STATUS_BAD_REQUEST: u32 = 3;

#[derive(Default)]
pub struct AgentConfig {
    /// Refuse the final handshake acknowledgement.
    pub refuse_ack: bool,
}

struct TxnEntry {
    prev: Uuid,
    next: Uuid,
    artifact_id: Uuid,
    block_id: Uuid,
    cert: Vec<u8>,
}

struct Block {
    id: Uuid,
    prev: Uuid,
    first_txn: Uuid,
    height: u64,
    cert: Vec<u8>,
}

/// Toy chain: every submitted transaction canonizes immediately into its
/// own block.
#[derive(Default)]
struct Chain {
    blocks: Vec<Block>,
    txns: HashMap<Uuid, TxnEntry>,
    artifacts: HashMap<Uuid, (Uuid, Uuid)>,
}

impl Chain {
    fn latest_block_id(&self) -> Uuid {
        self.blocks.last().map(|b| b.id).unwrap_or(ROOT_BLOCK_ID)
    }

    fn block_index(&self, id: &Uuid) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == *id)
    }

    fn submit(&mut self, txn_id: Uuid, artifact_id: Uuid, cert: Vec<u8>) -> u32 {
        if self.txns.contains_key(&txn_id) {
            return STATUS_BAD_REQUEST;
        }
        let prev_txn = match self.artifacts.get(&artifact_id) {
            Some((_, last)) => *last,
            None => ZERO_ID,
        };
        let block_id = Uuid::new_v4();
        if prev_txn != ZERO_ID {
            if let Some(entry) = self.txns.get_mut(&prev_txn) {
                entry.next = txn_id;
            }
        }
        self.txns.insert(
            txn_id,
            TxnEntry {
                prev: prev_txn,
                next: FULL_ID,
                artifact_id,
                block_id,
                cert: cert.clone(),
            },
        );
        self.artifacts
            .entry(artifact_id)
            .and_modify(|(_, last)| *last = txn_id)
            .or_insert((txn_id, txn_id));
        let height = self.blocks.len() as u64 + 1;
        self.blocks.push(Block {
            id: block_id,
            prev: self.blocks.last().map(|b| b.id).unwrap_or(ROOT_BLOCK_ID),
            first_txn: txn_id,
            height,
            cert,
        });
        STATUS_SUCCESS
    }

    fn block_record(&self, index: usize) -> BlockRecord {
        let block = &self.blocks[index];
        let next = self
            .blocks
            .get(index + 1)
            .map(|b| b.id)
            .unwrap_or(FULL_ID);
        BlockRecord {
            block_id: block.id,
            prev_block_id: block.prev,
            next_block_id: next,
            first_txn_id: block.first_txn,
            height: block.height,
            cert: block.cert.clone(),
        }
    }
}

struct RouteJob {
    caller_id: Uuid,
    verb: Uuid,
    payload: Vec<u8>,
    reply: mpsc::Sender<(u32, Vec<u8>)>,
}

#[derive(Default)]
struct Shared {
    chain: Mutex<Chain>,
    routes: Mutex<HashMap<Uuid, mpsc::Sender<RouteJob>>>,
}

/// Handle to the spawned agent. Threads are detached; the listener dies
/// with the test process.
pub struct MockAgent {
    addr: SocketAddr,
    agent_public: Identity,
}

pub struct MockAgentBuilder {
    agent: Identity,
    clients: HashMap<Uuid, ([u8; 32], Vec<u8>)>,
    config: AgentConfig,
}

impl MockAgentBuilder {
    pub fn new() -> Self {
        Self {
            agent: Identity::generate(),
            clients: HashMap::new(),
            config: AgentConfig::default(),
        }
    }

    /// Register a client the agent will accept.
    pub fn client(mut self, identity: &Identity) -> Self {
        self.clients.insert(
            *identity.artifact_id(),
            (
                *identity.public_encryption_key(),
                identity.public_signing_key().to_bytes().to_vec(),
            ),
        );
        self
    }

    pub fn refuse_ack(mut self) -> Self {
        self.config.refuse_ack = true;
        self
    }

    pub fn spawn(self) -> MockAgent {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let agent_public = self.agent.to_public();
        let shared = Arc::new(Shared::default());
        let tokens = Arc::new(AtomicU32::new(1));
        let agent = Arc::new(self.agent);
        let clients = Arc::new(self.clients);
        let config = Arc::new(self.config);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let agent = Arc::clone(&agent);
                let clients = Arc::clone(&clients);
                let config = Arc::clone(&config);
                let shared = Arc::clone(&shared);
                let tokens = Arc::clone(&tokens);
                thread::spawn(move || {
                    let _ = serve_connection(stream, &agent, &clients, &config, &shared, &tokens);
                });
            }
        });

        MockAgent { addr, agent_public }
    }
}

impl MockAgent {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The public credential clients verify the agent against.
    pub fn agent_public(&self) -> &Identity {
        &self.agent_public
    }

    pub fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).expect("connect to mock agent")
    }
}

/// Agent end of one established session: same cipher, counters mirrored.
struct AgentConn {
    stream: TcpStream,
    cipher: MessageCipher,
    recv_counter: u64,
    send_counter: u64,
}

impl AgentConn {
    fn recv_request(&mut self) -> vellum::Result<(RequestHeader, Vec<u8>)> {
        let frame = read_frame(&mut self.stream)?;
        let counter = self.recv_counter;
        self.recv_counter += 1;
        let body = self.cipher.open(counter, &frame)?;
        let (header, payload) = RequestHeader::decode(&body)?;
        Ok((header, payload.to_vec()))
    }

    fn send_response(
        &mut self,
        verb: Verb,
        offset: u32,
        status: u32,
        payload: &[u8],
    ) -> vellum::Result<()> {
        let counter = self.send_counter;
        self.send_counter += 1;
        let body = ResponseHeader {
            verb: verb.wire_id(),
            offset,
            status,
        }
        .encode_with_payload(payload);
        let sealed = self.cipher.seal(counter, &body)?;
        write_frame(&mut self.stream, &sealed)
    }
}

fn serve_connection(
    mut stream: TcpStream,
    agent: &Identity,
    clients: &HashMap<Uuid, ([u8; 32], Vec<u8>)>,
    config: &AgentConfig,
    shared: &Shared,
    tokens: &AtomicU32,
) -> vellum::Result<()> {
    // Step 1: plaintext handshake request.
    let frame = read_frame(&mut stream)?;
    let request = HandshakeRequest::decode(&frame)?;
    let Some((client_enc_key, _)) = clients.get(&request.client_id) else {
        let refusal = HandshakeResponse {
            status: STATUS_NOT_FOUND,
            agent_id: ZERO_ID,
            agent_public_key: Vec::new(),
            key_nonce: [0u8; 32],
            challenge_nonce: [0u8; 32],
        };
        return write_frame(&mut stream, &refusal.encode());
    };

    // Step 2: plaintext handshake response with our nonces.
    let key_nonce = generate_nonce();
    let challenge_nonce = generate_nonce();
    let response = HandshakeResponse {
        status: STATUS_SUCCESS,
        agent_id: *agent.artifact_id(),
        agent_public_key: agent.public_encryption_key().to_vec(),
        key_nonce,
        challenge_nonce,
    };
    write_frame(&mut stream, &response.encode())?;

    // Step 3: derive the same secret (client nonce first in the salt).
    let secret = derive_session_secret(
        agent.private_encryption_key()?,
        client_enc_key,
        &request.key_nonce,
        &key_nonce,
    )?;
    let mut conn = AgentConn {
        stream,
        cipher: MessageCipher::new(secret),
        recv_counter: CLIENT_IV_INITIAL,
        send_counter: SERVER_IV_INITIAL,
    };

    // Step 4: sealed acknowledgement must echo our challenge nonce.
    let (header, payload) = conn.recv_request()?;
    let ack = HandshakeAck::from_payload(&payload)?;
    if header.verb != Verb::HandshakeAcknowledge.wire_id() || ack.challenge_nonce != challenge_nonce
    {
        conn.send_response(Verb::HandshakeAcknowledge, 0, STATUS_BAD_REQUEST, &[])?;
        return Ok(());
    }
    if config.refuse_ack {
        conn.send_response(Verb::HandshakeAcknowledge, 0, STATUS_BAD_REQUEST, &[])?;
        return Ok(());
    }
    conn.send_response(Verb::HandshakeAcknowledge, 0, STATUS_SUCCESS, &[])?;

    serve_session(conn, request.client_id, shared, tokens)
}

fn serve_session(
    mut conn: AgentConn,
    client_id: Uuid,
    shared: &Shared,
    tokens: &AtomicU32,
) -> vellum::Result<()> {
    loop {
        let (header, payload) = conn.recv_request()?;
        let verb = match Verb::try_from(header.verb) {
            Ok(verb) => verb,
            Err(_) => {
                conn.send_response(Verb::StatusGet, header.offset, STATUS_BAD_REQUEST, &[])?;
                continue;
            }
        };
        match verb {
            Verb::StatusGet => {
                conn.send_response(verb, header.offset, STATUS_SUCCESS, &[])?;
            }
            Verb::ConnectionClose => {
                conn.send_response(verb, header.offset, STATUS_SUCCESS, &[])?;
                return Ok(());
            }
            Verb::LatestBlockIdGet => {
                let id = shared.chain.lock().unwrap().latest_block_id();
                conn.send_response(verb, header.offset, STATUS_SUCCESS, id.as_bytes())?;
            }
            Verb::TransactionSubmit => {
                let status = match decode_submit_payload(&payload) {
                    Ok((txn_id, artifact_id, cert)) => {
                        shared.chain.lock().unwrap().submit(txn_id, artifact_id, cert)
                    }
                    Err(_) => STATUS_BAD_REQUEST,
                };
                conn.send_response(verb, header.offset, status, &[])?;
            }
            Verb::BlockByIdGet => {
                let reply = {
                    let chain = shared.chain.lock().unwrap();
                    parse_id(&payload)
                        .and_then(|id| chain.block_index(&id))
                        .map(|i| chain.block_record(i).encode())
                };
                match reply {
                    Some(body) => {
                        conn.send_response(verb, header.offset, STATUS_SUCCESS, &body)?
                    }
                    None => conn.send_response(verb, header.offset, STATUS_NOT_FOUND, &[])?,
                }
            }
            Verb::BlockIdGetNext | Verb::BlockIdGetPrev => {
                let reply = {
                    let chain = shared.chain.lock().unwrap();
                    parse_id(&payload).and_then(|id| {
                        if id == ROOT_BLOCK_ID {
                            return match verb {
                                Verb::BlockIdGetNext => {
                                    Some(chain.blocks.first().map(|b| b.id).unwrap_or(FULL_ID))
                                }
                                _ => Some(ZERO_ID),
                            };
                        }
                        let i = chain.block_index(&id)?;
                        Some(match verb {
                            Verb::BlockIdGetNext => chain.block_record(i).next_block_id,
                            _ => chain.blocks[i].prev,
                        })
                    })
                };
                send_optional_id(&mut conn, verb, header.offset, reply)?;
            }
            Verb::BlockIdByHeightGet => {
                let reply = {
                    let chain = shared.chain.lock().unwrap();
                    parse_height(&payload).and_then(|h| {
                        if h == 0 {
                            Some(ROOT_BLOCK_ID)
                        } else {
                            chain.blocks.get(h as usize - 1).map(|b| b.id)
                        }
                    })
                };
                send_optional_id(&mut conn, verb, header.offset, reply)?;
            }
            Verb::TransactionByIdGet => {
                let reply = {
                    let chain = shared.chain.lock().unwrap();
                    parse_id(&payload).and_then(|id| {
                        chain.txns.get(&id).map(|e| {
                            TransactionRecord {
                                txn_id: id,
                                prev_txn_id: e.prev,
                                next_txn_id: e.next,
                                artifact_id: e.artifact_id,
                                block_id: e.block_id,
                                cert: e.cert.clone(),
                            }
                            .encode()
                        })
                    })
                };
                match reply {
                    Some(body) => {
                        conn.send_response(verb, header.offset, STATUS_SUCCESS, &body)?
                    }
                    None => conn.send_response(verb, header.offset, STATUS_NOT_FOUND, &[])?,
                }
            }
            Verb::TransactionIdGetNext | Verb::TransactionIdGetPrev
            | Verb::TransactionIdGetBlockId => {
                let reply = {
                    let chain = shared.chain.lock().unwrap();
                    parse_id(&payload).and_then(|id| {
                        chain.txns.get(&id).map(|e| match verb {
                            Verb::TransactionIdGetNext => e.next,
                            Verb::TransactionIdGetPrev => e.prev,
                            _ => e.block_id,
                        })
                    })
                };
                send_optional_id(&mut conn, verb, header.offset, reply)?;
            }
            Verb::ArtifactFirstTxnIdGet | Verb::ArtifactLastTxnIdGet => {
                let reply = {
                    let chain = shared.chain.lock().unwrap();
                    parse_id(&payload).and_then(|id| {
                        chain.artifacts.get(&id).map(|(first, last)| match verb {
                            Verb::ArtifactFirstTxnIdGet => *first,
                            _ => *last,
                        })
                    })
                };
                send_optional_id(&mut conn, verb, header.offset, reply)?;
            }
            Verb::ExtendedApiEnable => {
                let (job_tx, job_rx) = mpsc::channel();
                shared.routes.lock().unwrap().insert(client_id, job_tx);
                conn.send_response(verb, header.offset, STATUS_SUCCESS, &[])?;
                let result = serve_sentinel(&mut conn, job_rx, tokens);
                shared.routes.lock().unwrap().remove(&client_id);
                return result;
            }
            Verb::ExtendedApiSend => {
                route_send(&mut conn, client_id, header.offset, &payload, shared)?;
            }
            Verb::HandshakeRequest | Verb::HandshakeAcknowledge | Verb::ExtendedApiClientRequest
            | Verb::ExtendedApiResponse => {
                conn.send_response(verb, header.offset, STATUS_BAD_REQUEST, &[])?;
            }
        }
    }
}

/// Forward a routed request to the target sentinel and relay its answer.
fn route_send(
    conn: &mut AgentConn,
    caller_id: Uuid,
    offset: u32,
    payload: &[u8],
    shared: &Shared,
) -> vellum::Result<()> {
    if payload.len() < 32 {
        return conn.send_response(Verb::ExtendedApiResponse, offset, STATUS_BAD_REQUEST, &[]);
    }
    let sentinel_id = Uuid::from_slice(&payload[..16]).unwrap();
    let verb = Uuid::from_slice(&payload[16..32]).unwrap();
    let job_tx = shared.routes.lock().unwrap().get(&sentinel_id).cloned();
    let Some(job_tx) = job_tx else {
        return conn.send_response(Verb::ExtendedApiResponse, offset, STATUS_NOT_FOUND, &[]);
    };

    let (reply_tx, reply_rx) = mpsc::channel();
    let job = RouteJob {
        caller_id,
        verb,
        payload: payload[32..].to_vec(),
        reply: reply_tx,
    };
    if job_tx.send(job).is_err() {
        return conn.send_response(Verb::ExtendedApiResponse, offset, STATUS_NOT_FOUND, &[]);
    }
    match reply_rx.recv() {
        Ok((status, body)) => conn.send_response(Verb::ExtendedApiResponse, offset, status, &body),
        Err(_) => conn.send_response(Verb::ExtendedApiResponse, offset, STATUS_NOT_FOUND, &[]),
    }
}

/// Sentinel mode: push routed requests down the connection, read routed
/// responses back, and relay each answer to the waiting caller.
fn serve_sentinel(
    conn: &mut AgentConn,
    jobs: mpsc::Receiver<RouteJob>,
    tokens: &AtomicU32,
) -> vellum::Result<()> {
    while let Ok(job) = jobs.recv() {
        let token = tokens.fetch_add(1, Ordering::Relaxed);
        let mut body = Vec::with_capacity(32 + job.payload.len());
        body.extend_from_slice(job.caller_id.as_bytes());
        body.extend_from_slice(job.verb.as_bytes());
        body.extend_from_slice(&job.payload);
        conn.send_response(Verb::ExtendedApiClientRequest, token, STATUS_SUCCESS, &body)?;

        let (header, response) = conn.recv_request()?;
        if header.verb != Verb::ExtendedApiResponse.wire_id()
            || header.offset != token
            || response.len() < 4
        {
            let _ = job.reply.send((STATUS_BAD_REQUEST, Vec::new()));
            continue;
        }
        let status = u32::from_be_bytes(response[..4].try_into().unwrap());
        let _ = job.reply.send((status, response[4..].to_vec()));
    }
    Ok(())
}

fn parse_id(payload: &[u8]) -> Option<Uuid> {
    Uuid::from_slice(payload).ok()
}

fn parse_height(payload: &[u8]) -> Option<u64> {
    <[u8; 8]>::try_from(payload).ok().map(u64::from_be_bytes)
}

fn send_optional_id(
    conn: &mut AgentConn,
    verb: Verb,
    offset: u32,
    id: Option<Uuid>,
) -> vellum::Result<()> {
    match id {
        Some(id) => conn.send_response(verb, offset, STATUS_SUCCESS, id.as_bytes()),
        None => conn.send_response(verb, offset, STATUS_NOT_FOUND, &[]),
    }
}

/// An agent whose listener accepts and immediately drops connections.
pub fn unresponsive_listener() -> (SocketAddr, thread::JoinHandle<io::Result<()>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept()?;
        drop(stream);
        Ok(())
    });
    (addr, handle)
}
